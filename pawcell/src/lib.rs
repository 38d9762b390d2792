//! PAW cell bookkeeping: a flattened, globally addressable index over all
//! atoms, projector channels and magnetic quantum numbers, the per-k-point
//! projector form-factor cache, and the rhoij augmentation density matrix
//! accumulated from reciprocal-space wavefunctions.

mod projspec;
pub use projspec::*;

use gvector::GVector;
use lattice::Lattice;
use matrix::Matrix;
use pawconsts::*;
use pwbasis::PWBasis;
use tracing::{debug, info};
use types::c64;
use vector3::Vector3f64;

// Per-k-point projector table vkb[iprj][ig] on the plane waves selected by
// |k+G|^2 <= 2 ecut cell_factor. Rebuilt wholesale by set_paw_k.
struct PawK {
    k_cart: Vector3f64,
    npw: usize,
    vkb: Vec<Vec<c64>>,
}

pub struct PawCell {
    ecut: f64,
    cell_factor: f64,
    omega: f64,

    nat: usize,
    ntyp: usize,
    atom_type: Vec<usize>,
    atom_coord: Vec<Vector3f64>, // fractional
    specs: Vec<AtomTypeProjectorSpec>,

    lmax: usize,
    nproj_tot: usize,

    // Global projector index: atom slices [start_iprj[ia], start_iprj[ia] +
    // mstate) ordered by channel (file order), then m = -l..=l per channel.
    start_iprj: Vec<usize>,
    iprj_to_ia: Vec<usize>,
    iprj_to_im: Vec<usize>,
    iprj_to_il: Vec<usize>,
    iprj_to_l: Vec<usize>,
    iprj_to_m: Vec<i32>,

    paw_k: Option<PawK>,

    // One mstate x mstate block per atom, additive across k-points.
    rhoij: Vec<Matrix<c64>>,
}

impl PawCell {
    pub fn init(
        ecut: f64,
        cell_factor: f64,
        omega: f64,
        atom_type: &[usize],
        atom_coord: &[Vector3f64],
        filename_list: &[String],
        source: &dyn ProjectorSpecSource,
    ) -> Result<PawCell, PawError> {
        if !(ecut > 0.0) {
            return Err(PawError::BadParameter {
                name: "ecut",
                value: ecut,
            });
        }

        if !(cell_factor >= 1.0) {
            return Err(PawError::BadParameter {
                name: "cell_factor",
                value: cell_factor,
            });
        }

        if !(omega > 0.0) {
            return Err(PawError::BadParameter {
                name: "omega",
                value: omega,
            });
        }

        let nat = atom_type.len();
        let ntyp = filename_list.len();

        if nat == 0 {
            return Err(PawError::BadParameter {
                name: "nat",
                value: 0.0,
            });
        }

        if ntyp == 0 {
            return Err(PawError::BadParameter {
                name: "ntyp",
                value: 0.0,
            });
        }

        if atom_coord.len() != nat {
            return Err(PawError::AtomCountMismatch {
                nat,
                ncoord: atom_coord.len(),
            });
        }

        for (ia, &itype) in atom_type.iter().enumerate() {
            if itype >= ntyp {
                return Err(PawError::AtomTypeOutOfRange { ia, itype, ntyp });
            }
        }

        let mut specs = Vec::with_capacity(ntyp);

        for filename in filename_list.iter() {
            let spec = source.read_spec(filename)?;

            spec.validate()?;

            specs.push(spec);
        }

        let lmax = specs.iter().map(|s| s.lmax()).max().unwrap_or(0);

        let nproj_tot = atom_type.iter().map(|&t| specs[t].mstate()).sum();

        let mut start_iprj = vec![0; nat];
        let mut iprj_to_ia = Vec::with_capacity(nproj_tot);
        let mut iprj_to_im = Vec::with_capacity(nproj_tot);
        let mut iprj_to_il = Vec::with_capacity(nproj_tot);
        let mut iprj_to_l = Vec::with_capacity(nproj_tot);
        let mut iprj_to_m = Vec::with_capacity(nproj_tot);

        let mut iprj = 0;

        for (ia, &itype) in atom_type.iter().enumerate() {
            start_iprj[ia] = iprj;

            let mut im = 0;

            for (il, ch) in specs[itype].channels.iter().enumerate() {
                for m in utility::get_quant_num_m(ch.l) {
                    iprj_to_ia.push(ia);
                    iprj_to_im.push(im);
                    iprj_to_il.push(il);
                    iprj_to_l.push(ch.l);
                    iprj_to_m.push(m);

                    im += 1;
                    iprj += 1;
                }
            }
        }

        let rhoij = atom_type
            .iter()
            .map(|&t| {
                let ms = specs[t].mstate();

                Matrix::<c64>::new(ms, ms)
            })
            .collect();

        info!(nat, ntyp, nproj_tot, lmax, "paw cell initialized");

        Ok(PawCell {
            ecut,
            cell_factor,
            omega,
            nat,
            ntyp,
            atom_type: atom_type.to_vec(),
            atom_coord: atom_coord.to_vec(),
            specs,
            lmax,
            nproj_tot,
            start_iprj,
            iprj_to_ia,
            iprj_to_im,
            iprj_to_il,
            iprj_to_l,
            iprj_to_m,
            paw_k: None,
            rhoij,
        })
    }

    /// Rebuild the projector form-factor cache for one k-point (Cartesian).
    /// The previous cache, if any, is fully replaced.
    pub fn set_paw_k(&mut self, k_cart: Vector3f64, latt: &Lattice) -> Result<(), PawError> {
        let ecut_eff = self.ecut * self.cell_factor;

        let blatt = latt.reciprocal();

        // margin so the shifted sphere |k+G| stays inside the table
        let gmax = (2.0 * ecut_eff).sqrt() + k_cart.norm2();

        let gvec = GVector::new_for_cutoff(&blatt, gmax);

        let pwwfc = PWBasis::new(k_cart, 0, ecut_eff, &gvec);

        let npw = pwwfc.get_n_plane_waves();

        // Y_lm(k+G) for every plane wave
        let gcart = gvec.get_cart();

        let mut ylm_kg = Vec::with_capacity(npw);

        for &ig in pwwfc.get_gindex() {
            let xkg = k_cart + gcart[ig];

            ylm_kg.push(special::calc_ylm(self.lmax, xkg)?);
        }

        // radial transforms per species and channel on |k+G|
        let mut kgbeta_all = Vec::with_capacity(self.ntyp);

        for spec in self.specs.iter() {
            let mut kgbeta_one = Vec::with_capacity(spec.channels.len());

            for ch in spec.channels.iter() {
                kgbeta_one.push(compute_kgbeta(
                    pwwfc.get_kg(),
                    ch.l,
                    &ch.beta,
                    &spec.rad,
                    &spec.rab,
                    self.omega,
                )?);
            }

            kgbeta_all.push(kgbeta_one);
        }

        // structure factor per atom
        let sfact_all: Vec<Vec<c64>> = self
            .atom_coord
            .iter()
            .map(|&tau| {
                fhkl::compute_structure_factor_for_many_g_one_atom(
                    gvec.get_miller(),
                    pwwfc.get_gindex(),
                    tau,
                )
            })
            .collect();

        // assemble the per-projector table
        let mut vkb = vec![vec![ZERO_C64; npw]; self.nproj_tot];

        for ip in 0..self.nproj_tot {
            let ia = self.iprj_to_ia[ip];
            let il = self.iprj_to_il[ip];
            let l = self.iprj_to_l[ip];
            let m = self.iprj_to_m[ip];

            let iylm = l * l + (l as i32 + m) as usize;

            let beta = &kgbeta_all[self.atom_type[ia]][il];
            let sfact = &sfact_all[ia];

            for iw in 0..npw {
                vkb[ip][iw] = beta[iw] * ylm_kg[iw][iylm] * sfact[iw];
            }
        }

        debug!(npw, kx = k_cart.x, ky = k_cart.y, kz = k_cart.z, "paw k cache rebuilt");

        self.paw_k = Some(PawK { k_cart, npw, vkb });

        Ok(())
    }

    /// Add this k-point's contribution to rhoij:
    /// rhoij[ia][i][j] += sum_n occ[n] conj(<p_i|psi_n>) <p_j|psi_n>
    /// with <p_i|psi_n> = sum_G vkb[i][G]^* psi_n(G).
    ///
    /// `wfc` holds one band per column over the cached plane waves.
    pub fn accumulate_rhoij(&mut self, occ: &[f64], wfc: &Matrix<c64>) -> Result<(), PawError> {
        let nbands = wfc.get_ncol();

        let overlaps = match self.paw_k.as_ref() {
            None => return Err(PawError::KPointNotSet),

            Some(paw_k) => {
                if occ.len() != nbands {
                    return Err(PawError::BandCountMismatch {
                        nocc: occ.len(),
                        nbands,
                    });
                }

                if wfc.get_nrow() != paw_k.npw {
                    return Err(PawError::CoefficientLengthMismatch {
                        nrow: wfc.get_nrow(),
                        npw: paw_k.npw,
                    });
                }

                let mut overlaps = vec![vec![ZERO_C64; self.nproj_tot]; nbands];

                for (n, row) in overlaps.iter_mut().enumerate() {
                    let psi = wfc.get_col(n);

                    for (ip, vkb) in paw_k.vkb.iter().enumerate() {
                        row[ip] = utility::zdot_product(vkb, psi);
                    }
                }

                overlaps
            }
        };

        for (n, &occ_n) in occ.iter().enumerate() {
            for ia in 0..self.nat {
                let p0 = self.start_iprj[ia];
                let ms = self.specs[self.atom_type[ia]].mstate();

                let block = &mut self.rhoij[ia];

                for i in 0..ms {
                    let pi = overlaps[n][p0 + i];

                    for j in 0..ms {
                        let pj = overlaps[n][p0 + j];

                        block[[i, j]] += occ_n * pi.conj() * pj;
                    }
                }
            }
        }

        Ok(())
    }

    /// Zero the accumulator; call between independent density evaluations.
    pub fn reset_rhoij(&mut self) {
        for block in self.rhoij.iter_mut() {
            block.set_zeros();
        }
    }

    pub fn get_rhoij(&self) -> &[Matrix<c64>] {
        self.rhoij.as_slice()
    }

    /// Cartesian k-point of the cached grid, if one is set.
    pub fn get_cached_k(&self) -> Option<Vector3f64> {
        self.paw_k.as_ref().map(|p| p.k_cart)
    }

    /// Plane-wave count of the cached grid, if one is set.
    pub fn get_cached_npw(&self) -> Option<usize> {
        self.paw_k.as_ref().map(|p| p.npw)
    }

    pub fn get_nat(&self) -> usize {
        self.nat
    }

    pub fn get_ntyp(&self) -> usize {
        self.ntyp
    }

    pub fn get_nproj_tot(&self) -> usize {
        self.nproj_tot
    }

    pub fn get_lmax(&self) -> usize {
        self.lmax
    }

    pub fn get_mstate(&self, itype: usize) -> usize {
        self.specs[itype].mstate()
    }

    pub fn get_atom_type(&self) -> &[usize] {
        self.atom_type.as_slice()
    }

    pub fn get_start_iprj(&self) -> &[usize] {
        self.start_iprj.as_slice()
    }

    pub fn get_iprj_to_ia(&self) -> &[usize] {
        self.iprj_to_ia.as_slice()
    }

    pub fn get_iprj_to_im(&self) -> &[usize] {
        self.iprj_to_im.as_slice()
    }

    pub fn get_iprj_to_il(&self) -> &[usize] {
        self.iprj_to_il.as_slice()
    }

    pub fn get_iprj_to_l(&self) -> &[usize] {
        self.iprj_to_l.as_slice()
    }

    pub fn get_iprj_to_m(&self) -> &[i32] {
        self.iprj_to_m.as_slice()
    }
}

// Radial projector transform on the |k+G| table:
// 4 pi / sqrt(omega) * int beta(r) r j_l(|k+G| r) dr
// PRB, 51, 14697 (1995), Eq.11
fn compute_kgbeta(
    kg: &[f64],
    l: usize,
    beta: &[f64],
    rad: &[f64],
    rab: &[f64],
    omega: f64,
) -> Result<Vec<f64>, PawError> {
    let npw = kg.len();

    let mut vg = vec![0.0; npw];

    let mmax = rad.len();

    let mut work = vec![0.0; mmax];

    let fact = FOURPI / omega.sqrt();

    for iw in 0..npw {
        for i in 0..mmax {
            let r = rad[i];

            work[i] = beta[i] * r * special::spherical_bessel_jn(l, kg[iw] * r)?;
        }

        vg[iw] = fact * integral::simpson_rab(&work, rab);
    }

    Ok(vg)
}

#[cfg(test)]
mod tests;
