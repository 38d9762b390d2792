/// Simpson quadrature on a radial grid with precomputed dr/di weights `rab`.
///
/// An even number of points leaves one interval over; that tail is handled
/// with a 3/8 rule over the last four points.
pub fn simpson_rab(y: &[f64], rab: &[f64]) -> f64 {
    assert_eq!(y.len(), rab.len());

    let mut n = y.len();

    if n % 2 == 0 {
        n -= 3;
    }

    let r12 = 1.0 / 3.0;

    let mut t1;
    let mut t2;
    let mut t3 = y[0] * rab[0] * r12;

    let mut s = 0.0;

    for i in (0..n - 1).step_by(2) {
        t1 = t3;

        t2 = y[i + 1] * rab[i + 1] * r12;

        t3 = y[i + 2] * rab[i + 2] * r12;

        s += t1 + 4.0 * t2 + t3;
    }

    if y.len() % 2 == 0 {
        let n = y.len();

        let r38 = 3.0 / 8.0;

        s += y[n - 4] * rab[n - 4] * r38
            + 3.0 * y[n - 3] * rab[n - 3] * r38
            + 3.0 * y[n - 2] * rab[n - 2] * r38
            + y[n - 1] * rab[n - 1] * r38;
    }

    s
}
