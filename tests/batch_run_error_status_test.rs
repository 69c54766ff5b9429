/// HTTP surface contract tests for the batch core's error and scope types.
///
/// Mirrors the shapes in `src/errors.rs` and `src/services/orchestrator.rs`
/// at arm's length (no lib target to import from, matching how this
/// project's other integration tests are written) to pin down the
/// status-code mapping and lock-key uniqueness invariants those modules
/// promise.

#[derive(Debug)]
enum ApiError {
    Db,
    Validation,
    NotFound,
    Conflict,
    RateLimited,
    External,
    Unauthorized,
    Config,
    LockHeld,
    Cancelled,
}

fn status_code(err: &ApiError) -> u16 {
    match err {
        ApiError::NotFound => 404,
        ApiError::Validation => 400,
        ApiError::Unauthorized => 401,
        ApiError::Conflict => 409,
        ApiError::RateLimited => 429,
        ApiError::External => 502,
        ApiError::Config => 500,
        ApiError::LockHeld => 409,
        ApiError::Cancelled => 500,
        ApiError::Db => 500,
    }
}

#[test]
fn lock_held_and_conflict_share_409() {
    assert_eq!(status_code(&ApiError::LockHeld), 409);
    assert_eq!(status_code(&ApiError::Conflict), 409);
}

#[test]
fn rate_limited_is_429_so_callers_can_back_off() {
    assert_eq!(status_code(&ApiError::RateLimited), 429);
}

#[test]
fn not_found_is_404() {
    assert_eq!(status_code(&ApiError::NotFound), 404);
}

// ---------------------------------------------------------------------------
// Lock key uniqueness (§4.G/§9: at most one batch run holds the orchestrator
// lock at a time, across every scope).
// ---------------------------------------------------------------------------

const GLOBAL_LOCK_KEY: i64 = 0x5347_4152_4953_4B;

fn portfolio_lock_key(portfolio_id_bytes: &[u8; 16]) -> i64 {
    i64::from_be_bytes(portfolio_id_bytes[0..8].try_into().unwrap())
}

#[test]
fn global_lock_key_never_collides_with_a_portfolio_key() {
    let portfolio_id = [1u8; 16];
    assert_ne!(GLOBAL_LOCK_KEY, portfolio_lock_key(&portfolio_id));
}

#[test]
fn distinct_portfolios_get_distinct_lock_keys() {
    let a = [1u8; 16];
    let mut b = [1u8; 16];
    b[15] = 2;
    assert_ne!(portfolio_lock_key(&a), portfolio_lock_key(&b));
}

#[test]
fn the_same_portfolio_always_derives_the_same_lock_key() {
    let portfolio_id = [7u8; 16];
    assert_eq!(portfolio_lock_key(&portfolio_id), portfolio_lock_key(&portfolio_id));
}
