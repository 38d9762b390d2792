use itertools::multizip;
use types::c64;
use vector3::*;

/// Magnetic quantum numbers -l..=l in increasing order.
pub fn get_quant_num_m(l: usize) -> Vec<i32> {
    (0..2 * l + 1).map(|im| im as i32 - l as i32).collect()
}

pub fn zdot_product(u: &[c64], v: &[c64]) -> c64 {
    assert_eq!(u.len(), v.len());

    multizip((u.iter(), v.iter()))
        .map(|(x, y)| x.conj() * (*y))
        .sum()
}

pub fn dot_product_v3i32_v3f64(g: Vector3i32, r: Vector3f64) -> f64 {
    f64::from(g.x) * r.x + f64::from(g.y) * r.y + f64::from(g.z) * r.z
}

pub fn argsort<T: PartialOrd>(v: &[T]) -> Vec<usize> {
    let mut idx = (0..v.len()).collect::<Vec<_>>();

    idx.sort_by(|&i, &j| v[i].partial_cmp(&v[j]).unwrap());

    idx
}

/// N even, 8
///
/// n : 0 1 2 3 4 5 6 7
///
/// i : 0 1 2 3 4 -3 -2 -1
///
/// N Odd, 7
///
/// n : 0 1 2 3 4 5 6
///
/// i : 0 1 2 3 -3 -2 -1
pub fn fft_left_end(n: usize) -> i32 {
    let nn = n as i32;

    if n % 2 == 0 {
        -(nn - 2) / 2
    } else {
        -(nn - 1) / 2
    }
}

pub fn fft_right_end(n: usize) -> i32 {
    let nn = n as i32;

    if n % 2 == 0 {
        nn / 2
    } else {
        (nn - 1) / 2
    }
}
