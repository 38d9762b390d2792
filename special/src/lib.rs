use pawconsts::*;
use thiserror::Error;
use vector3::Vector3f64;

#[derive(Debug, Error, PartialEq)]
pub enum DomainError {
    #[error("order m = {m} exceeds degree l = {l}")]
    OrderExceedsDegree { l: usize, m: usize },

    #[error("argument {x} lies outside [-1, 1]")]
    ArgumentOutOfRange { x: f64 },

    #[error("spherical bessel function for n = {n} is not implemented")]
    UnsupportedBesselOrder { n: usize },
}

/// Associated Legendre polynomial P_l^m(x) for 0 <= m <= l and x in [-1, 1].
///
/// The base case P_m^m = (-1)^m (2m-1)!! (1-x^2)^(m/2) carries the
/// Condon-Shortley phase; the upward recurrence
/// (l-m) P_l^m = x (2l-1) P_{l-1}^m - (l+m-1) P_{l-2}^m raises the degree.
///
/// Arguments overshooting |x| = 1 by rounding noise are clamped to the
/// boundary; larger deviations are rejected.
pub fn ass_leg_pol(l: usize, m: usize, arg: f64) -> Result<f64, DomainError> {
    if m > l {
        return Err(DomainError::OrderExceedsDegree { l, m });
    }

    let mut x = arg;

    if x.abs() > 1.0 {
        if x.abs() - 1.0 > EPS10 {
            return Err(DomainError::ArgumentOutOfRange { x });
        }

        x = x.signum();
    }

    let mut polmm = 1.0;

    if m > 0 {
        let sqx = (1.0 - x * x).sqrt();

        for i in 1..=m {
            polmm *= (1.0 - 2.0 * i as f64) * sqx;
        }
    }

    if l == m {
        return Ok(polmm);
    }

    let mut polmmp1 = x * (2.0 * m as f64 + 1.0) * polmm;

    if l == m + 1 {
        return Ok(polmmp1);
    }

    let mut pll = 0.0;

    for ll in m + 2..=l {
        pll = (x * (2.0 * ll as f64 - 1.0) * polmmp1 - (ll + m - 1) as f64 * polmm)
            / (ll - m) as f64;

        polmm = polmmp1;
        polmmp1 = pll;
    }

    Ok(pll)
}

/// Real spherical harmonics Y_lm(r) for all (l, m) with l <= lmax, stored at
/// index l*l + l + m (increasing l, then increasing m).
///
/// The direction need not be normalized. The zero vector yields the l = 0
/// limit 1/sqrt(4 pi) with all higher terms zero.
///
/// Convention: sqrt((2l+1)/(4 pi) * (l-|m|)!/(l+|m|)!) * P_l^|m|(cos theta)
/// with the Condon-Shortley phase from `ass_leg_pol`, times sqrt(2) cos(m phi)
/// for m > 0 and sqrt(2) sin(|m| phi) for m < 0.
pub fn calc_ylm(lmax: usize, r: Vector3f64) -> Result<Vec<f64>, DomainError> {
    let size = (lmax + 1) * (lmax + 1);

    let mut ylm = vec![0.0; size];

    ylm[0] = 1.0 / FOURPI.sqrt();

    let rr = r.norm2();

    if rr < EPS12 {
        return Ok(ylm);
    }

    let ctheta = (r.z / rr).clamp(-1.0, 1.0);

    let xy = (r.x * r.x + r.y * r.y).sqrt();

    let phi = if xy > EPS12 * rr {
        r.y.atan2(r.x)
    } else {
        0.0
    };

    for l in 1..=lmax {
        let fact = ((2.0 * l as f64 + 1.0) / FOURPI).sqrt();

        let i0 = l * l + l;

        for m in 0..=l {
            let ylmcst = fact * (factorial(l - m) / factorial(l + m)).sqrt();

            let plm = ass_leg_pol(l, m, ctheta)?;

            if m == 0 {
                ylm[i0] = ylmcst * plm;
            } else {
                let work = ylmcst * SQRT2 * plm;

                ylm[i0 + m] = work * (m as f64 * phi).cos();
                ylm[i0 - m] = work * (m as f64 * phi).sin();
            }
        }
    }

    Ok(ylm)
}

fn factorial(n: usize) -> f64 {
    (1..=n).map(|i| i as f64).product()
}

/// Highest order `spherical_bessel_jn` has a closed form for.
pub const JN_NMAX: usize = 4;

// https://en.wikipedia.org/wiki/Bessel_function#Spherical_Bessel_functions:_jn,_yn
//
// The closed forms lose precision as x -> 0, so small arguments switch to the
// truncated Taylor series.
pub fn spherical_bessel_jn(n: usize, x: f64) -> Result<f64, DomainError> {
    if n > JN_NMAX {
        return Err(DomainError::UnsupportedBesselOrder { n });
    }

    if x < EPS6 {
        let x2 = x * x;

        let y = match n {
            0 => 1.0 - x2 / 6.0 + x2 * x2 / 120.0,

            1 => x / 3.0 - x * x2 / 30.0 + x * x2 * x2 / 840.0,

            2 => x2 / 15.0 - x2 * x2 / 210.0,

            3 => x * x2 / 105.0 - x * x2 * x2 / 1890.0,

            4 => x2 * x2 / 945.0,

            _ => unreachable!(),
        };

        return Ok(y);
    }

    let y = match n {
        0 => x.sin() / x,

        1 => x.sin() / x / x - x.cos() / x,

        2 => (3.0 / x / x - 1.0) * x.sin() / x - 3.0 * x.cos() / x / x,

        3 => {
            (15.0 / x.powi(4) - 6.0 / x.powi(2)) * x.sin() - (15.0 / x.powi(3) - 1.0 / x) * x.cos()
        }

        4 => {
            (105.0 / x.powi(5) - 45.0 / x.powi(3) + 1.0 / x) * x.sin()
                - (105.0 / x.powi(4) - 10.0 / x.powi(2)) * x.cos()
        }

        _ => unreachable!(),
    };

    Ok(y)
}
