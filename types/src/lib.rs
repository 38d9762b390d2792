/// Double precision complex scalar used throughout the workspace.
#[allow(non_camel_case_types)]
pub type c64 = num_complex::Complex<f64>;
