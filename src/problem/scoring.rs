use crate::problem::snapshot::Test;

/// Points distributed over the tests of a package that declares none.
pub const TOTAL_CREDIT: u64 = 100;

/// If no test carries points, spreads [`TOTAL_CREDIT`] over all tests in order: every test gets
/// `floor(credit / remaining)` of what is left, so the rounding remainder lands on the last tests.
/// Declared points are left untouched.
pub fn distribute_scores(tests: &mut [Test]) {
    if tests.iter().any(|test| test.score != 0.0) {
        return;
    }

    let mut credit = TOTAL_CREDIT;
    let count = tests.len() as u64;
    for (position, test) in tests.iter_mut().enumerate() {
        let score = credit / (count - position as u64);
        test.score = score as f64;
        credit -= score;
    }
}
