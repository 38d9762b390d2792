use itertools::multizip;
use lattice::Lattice;
use pawconsts::TWOPI;
use utility;
use vector3::{Vector3f64, Vector3i32};

// Table of reciprocal-lattice vectors, ordered by increasing |G|.
#[derive(Debug)]
pub struct GVector {
    miller: Vec<Vector3i32>,
    cart: Vec<Vector3f64>,
}

impl GVector {
    pub fn new(blatt: &Lattice, n1: usize, n2: usize, n3: usize) -> GVector {
        let nsize = n1 * n2 * n3;

        // generate miller index

        let mut t_miller = vec![Vector3i32::zeros(); nsize];

        set_miller(t_miller.as_mut_slice(), n1, n2, n3);

        // calculate cartesian coordinates of miller index

        let mut t_cart = vec![Vector3f64::zeros(); nsize];

        miller_to_cart(t_cart.as_mut_slice(), t_miller.as_slice(), blatt);

        // order by vector length

        let mut t_g: Vec<f64> = vec![0.0; nsize];

        set_g_norm(t_g.as_mut_slice(), t_cart.as_slice());

        let ordered_index = utility::argsort(&t_g);

        let mut cart = vec![Vector3f64::zeros(); nsize];
        let mut miller = vec![Vector3i32::zeros(); nsize];

        for (i, &j) in ordered_index.iter().enumerate() {
            cart[i] = t_cart[j];
            miller[i] = t_miller[j];
        }

        GVector { miller, cart }
    }

    /// Build a table guaranteed to cover the sphere |k+G| <= gmax for any k
    /// in the first Brillouin zone. The Miller bound per axis follows from
    /// m_i = G . a_i / 2 pi.
    pub fn new_for_cutoff(blatt: &Lattice, gmax: f64) -> GVector {
        let alatt = blatt.reciprocal();

        let avs = [
            alatt.get_vector_a(),
            alatt.get_vector_b(),
            alatt.get_vector_c(),
        ];

        let mut n = [0usize; 3];

        for (ni, av) in multizip((n.iter_mut(), avs.iter())) {
            let bound = (gmax * av.norm2() / TWOPI).ceil() as usize + 1;

            *ni = 2 * bound + 1;
        }

        GVector::new(blatt, n[0], n[1], n[2])
    }

    pub fn get_miller(&self) -> &[Vector3i32] {
        self.miller.as_slice()
    }

    pub fn get_cart(&self) -> &[Vector3f64] {
        self.cart.as_slice()
    }

    pub fn set_g_vector_index(&self, ecut: f64, xk: Vector3f64, gindex: &mut [usize]) {
        let mut npw = 0;

        let two_ecut = 2.0 * ecut;

        for (i, g) in self.cart.iter().enumerate() {
            let kg = xk + *g;

            let kg2 = kg.dot_product(&kg);

            if kg2 <= two_ecut {
                gindex[npw] = i;

                npw += 1;
            }
        }
    }

    // |k+G|^2 <= 2*Ecut
    pub fn get_n_plane_waves(&self, ecut: f64, xk: Vector3f64) -> usize {
        let two_ecut = 2.0 * ecut;

        self.cart
            .iter()
            .filter(|g| {
                let kg = xk + **g;

                kg.dot_product(&kg) <= two_ecut
            })
            .count()
    }
}

fn set_g_norm(g: &mut [f64], cart: &[Vector3f64]) {
    for (x, y) in multizip((g.iter_mut(), cart.iter())) {
        *x = y.norm2();
    }
}

// x = i * b1.x + j * b2.x + k * b3.x, etc.
fn miller_to_cart(cart: &mut [Vector3f64], miller: &[Vector3i32], blatt: &Lattice) {
    let a = blatt.get_vector_a();
    let b = blatt.get_vector_b();
    let c = blatt.get_vector_c();

    for (ct, mi) in multizip((cart.iter_mut(), miller.iter())) {
        let i = mi.x as f64;
        let j = mi.y as f64;
        let k = mi.z as f64;

        ct.x = i * a.x + j * b.x + k * c.x;
        ct.y = i * a.y + j * b.y + k * c.y;
        ct.z = i * a.z + j * b.z + k * c.z;
    }
}

fn set_miller(miller: &mut [Vector3i32], n1: usize, n2: usize, n3: usize) {
    let i1 = utility::fft_left_end(n1);
    let i2 = utility::fft_left_end(n2);
    let i3 = utility::fft_left_end(n3);

    let j1 = utility::fft_right_end(n1);
    let j2 = utility::fft_right_end(n2);
    let j3 = utility::fft_right_end(n3);

    let mut ig = 0;
    for i in i1..j1 + 1 {
        for j in i2..j2 + 1 {
            for k in i3..j3 + 1 {
                miller[ig].x = i;
                miller[ig].y = j;
                miller[ig].z = k;

                ig += 1;
            }
        }
    }
}
