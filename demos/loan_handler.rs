use loanhub_errors::config::{self, Options};
use loanhub_errors::{
    BoxError, Error, RequestTrace, Response, ResponseBuilder, ResponseError, ResultExt, Severity,
    Status, StatusType, catalog, codes,
};
use serde_json::json;
use std::error::Error as StdError;
use std::sync::LazyLock;

// Marketplace-specific statuses, declared once on top of the catalog tags.
static LOAN_CLOSED: LazyLock<StatusType> = LazyLock::new(|| {
    Status::new("LOAN_CLOSED", Error::new("loan closed"))
        .with_severity(Severity::Warning)
        .with_public_msg("Loan Closed")
        .with_user_msg("This loan is fully funded and no longer accepts offers.")
        .add_base(catalog::catalog().expected())
        .with_http(409)
        .with_grpc(9)
        .freeze()
});

fn find_loan(id: u64) -> loanhub_errors::Result<&'static str> {
    match id {
        1 => Ok("open"),
        2 => Ok("closed"),
        _ => Err(catalog::new_not_found()
            .with_internal_msgf(format_args!("loan {} not in ledger", id))
            .into_error()),
    }
}

fn propose_loan(id: u64, amount: u64) -> loanhub_errors::Result<serde_json::Value> {
    let state = find_loan(id).wrap_err("propose loan")?;
    if state == "closed" {
        return Err(Error::wrap(LOAN_CLOSED.new(), "propose loan"));
    }
    if amount == 0 {
        return Err(catalog::new_bad_request()
            .with_internal_msg("amount must be positive")
            .with_data(json!({"field": "amount"}))
            .into_error());
    }
    Ok(json!({"loan": id, "amount": amount, "status": "proposed"}))
}

// Older handler still on the legacy error shape.
fn approve_loan(id: u64) -> Result<serde_json::Value, BoxError> {
    if id > 100 {
        return Err(Box::new(ResponseError::new(
            format!("approver quota exceeded for loan {}", id),
            codes::TOO_MANY_REQUESTS,
        )));
    }
    let state = find_loan(id).map_err(|e| ResponseError::wrap_err(e, Some("approve loan")))?;
    Ok(json!({"loan": id, "state": state, "approved": true}))
}

fn respond_ok(trace: &RequestTrace, data: serde_json::Value) {
    let body = Response::data(trace.request_id(), trace.processing_time(), data);
    print_response(200, &body);
}

fn respond_err(trace: &RequestTrace, err: &(dyn StdError + 'static)) {
    let (status, body) = ResponseBuilder::from_settings().build_for(trace, err, None);
    print_response(status, &body);
}

fn print_response(status: u16, body: &Response) {
    body.log();

    println!("HTTP {}", status);
    match serde_json::to_string_pretty(body) {
        Ok(wire) => println!("{}\n", wire),
        Err(err) => println!("unserializable body: {}\n", err),
    }
}

fn main() {
    // APP_ENV=development shows error details and stack traces.
    if let Err(err) = config::init(Options::from_env()) {
        eprintln!("{}", err);
    }

    println!("--- Loan Handler Example ---\n");

    let cases: [(u64, u64); 4] = [(1, 5_000), (2, 5_000), (3, 5_000), (1, 0)];
    for (id, amount) in cases {
        let trace = RequestTrace::start();
        println!("propose loan={} amount={}", id, amount);
        match propose_loan(id, amount) {
            Ok(data) => respond_ok(&trace, data),
            Err(err) => respond_err(&trace, &err),
        }
    }

    for id in [1, 7, 101] {
        let trace = RequestTrace::start();
        println!("approve loan={}", id);
        match approve_loan(id) {
            Ok(data) => respond_ok(&trace, data),
            Err(err) => respond_err(&trace, &*err),
        }
    }
}
