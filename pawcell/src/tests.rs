use super::*;

use pawconsts::*;

// Channel l-lists taken from the JTH valence-state tables:
//   Fe : 3s 4s 3p p* 3d d*  ->  0,0,1,1,2,2   mstate = 18
//   O  : 2s s* 2p p*        ->  0,0,1,1       mstate = 8
//   H  : 1s s* p*           ->  0,0,1         mstate = 5
// Radial parts are smooth gaussian-type stand-ins on a uniform grid; the
// index builder only consumes l and channel order.
struct JthFixtureSource;

impl ProjectorSpecSource for JthFixtureSource {
    fn read_spec(&self, filename: &str) -> Result<AtomTypeProjectorSpec, PawError> {
        let (symbol, ls): (&str, Vec<usize>) = match filename {
            "Fe.GGA_PBE-JTH.xml" => ("Fe", vec![0, 0, 1, 1, 2, 2]),
            "O.GGA_PBE-JTH.xml" => ("O", vec![0, 0, 1, 1]),
            "H.LDA_PW-JTH.xml" => ("H", vec![0, 0, 1]),
            _ => {
                return Err(PawError::SpecSource {
                    filename: filename.to_string(),
                    reason: "no such fixture".to_string(),
                })
            }
        };

        let nmesh = 121;
        let dr = 0.025;

        let rad: Vec<f64> = (0..nmesh).map(|i| i as f64 * dr).collect();
        let rab = vec![dr; nmesh];

        let mut seen = Vec::new();

        let channels = ls
            .iter()
            .map(|&l| {
                // first channel of each l is a bound state, later ones are not
                let n = if seen.contains(&l) {
                    None
                } else {
                    seen.push(l);
                    Some(l as u32 + 1)
                };

                let beta = rad
                    .iter()
                    .map(|&r| r.powi(l as i32 + 1) * (-r * r).exp())
                    .collect();

                ProjectorChannel { n, l, beta }
            })
            .collect();

        Ok(AtomTypeProjectorSpec {
            symbol: symbol.to_string(),
            rad,
            rab,
            channels,
        })
    }
}

fn fixture_filenames() -> Vec<String> {
    vec![
        "Fe.GGA_PBE-JTH.xml".to_string(),
        "O.GGA_PBE-JTH.xml".to_string(),
        "H.LDA_PW-JTH.xml".to_string(),
    ]
}

// Fe, O, H, O, H
fn fixture_cell() -> PawCell {
    let atom_type = [0, 1, 2, 1, 2];
    let atom_coord = vec![Vector3f64::zeros(); 5];

    PawCell::init(
        50.0,
        1.2,
        1.0,
        &atom_type,
        &atom_coord,
        &fixture_filenames(),
        &JthFixtureSource,
    )
    .unwrap()
}

#[test]
fn test_paw_cell_index() {
    let paw_cell = fixture_cell();

    // 18 + 2 * 8 + 2 * 5 = 44
    assert_eq!(paw_cell.get_nproj_tot(), 44);
    assert_eq!(paw_cell.get_lmax(), 2);

    let iprj_to_ia = paw_cell.get_iprj_to_ia();
    assert_eq!(iprj_to_ia.len(), 44);
    for ip in 0..18 {
        assert_eq!(iprj_to_ia[ip], 0);
    }
    for ip in 0..8 {
        assert_eq!(iprj_to_ia[18 + ip], 1);
    }
    for ip in 0..5 {
        assert_eq!(iprj_to_ia[26 + ip], 2);
    }
    for ip in 0..8 {
        assert_eq!(iprj_to_ia[31 + ip], 3);
    }
    for ip in 0..5 {
        assert_eq!(iprj_to_ia[39 + ip], 4);
    }

    let iprj_to_im = paw_cell.get_iprj_to_im();
    assert_eq!(iprj_to_im.len(), 44);
    for ip in 0..18 {
        assert_eq!(iprj_to_im[ip], ip);
    }
    for ip in 0..8 {
        assert_eq!(iprj_to_im[18 + ip], ip);
    }
    for ip in 0..5 {
        assert_eq!(iprj_to_im[26 + ip], ip);
    }
    for ip in 0..8 {
        assert_eq!(iprj_to_im[31 + ip], ip);
    }
    for ip in 0..5 {
        assert_eq!(iprj_to_im[39 + ip], ip);
    }

    let iprj_to_il_ref = [
        0, 1, 2, 2, 2, 3, 3, 3, 4, 4, 4, 4, 4, 5, 5, 5, 5, 5, //
        0, 1, 2, 2, 2, 3, 3, 3, //
        0, 1, 2, 2, 2, //
        0, 1, 2, 2, 2, 3, 3, 3, //
        0, 1, 2, 2, 2,
    ];
    assert_eq!(paw_cell.get_iprj_to_il(), &iprj_to_il_ref);

    let iprj_to_l_ref = [
        0, 0, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, //
        0, 0, 1, 1, 1, 1, 1, 1, //
        0, 0, 1, 1, 1, //
        0, 0, 1, 1, 1, 1, 1, 1, //
        0, 0, 1, 1, 1,
    ];
    assert_eq!(paw_cell.get_iprj_to_l(), &iprj_to_l_ref);

    let iprj_to_m_ref = [
        0, 0, -1, 0, 1, -1, 0, 1, -2, -1, 0, 1, 2, -2, -1, 0, 1, 2, //
        0, 0, -1, 0, 1, -1, 0, 1, //
        0, 0, -1, 0, 1, //
        0, 0, -1, 0, 1, -1, 0, 1, //
        0, 0, -1, 0, 1,
    ];
    assert_eq!(paw_cell.get_iprj_to_m(), &iprj_to_m_ref);

    assert_eq!(paw_cell.get_start_iprj(), &[0, 18, 26, 31, 39]);
}

#[test]
fn test_index_invariants() {
    let paw_cell = fixture_cell();

    let nat = paw_cell.get_nat();
    let start = paw_cell.get_start_iprj();
    let nproj_tot = paw_cell.get_nproj_tot();

    // prefix sums of mstate
    let mstate_sum: usize = paw_cell
        .get_atom_type()
        .iter()
        .map(|&t| paw_cell.get_mstate(t))
        .sum();
    assert_eq!(mstate_sum, nproj_tot);

    assert_eq!(start[0], 0);
    for ia in 1..nat {
        let t = paw_cell.get_atom_type()[ia - 1];
        assert_eq!(start[ia], start[ia - 1] + paw_cell.get_mstate(t));
    }

    // im restarts at each atom boundary and counts up by one
    let ia_of = paw_cell.get_iprj_to_ia();
    let im_of = paw_cell.get_iprj_to_im();

    for ip in 0..nproj_tot {
        let ia = ia_of[ip];
        assert_eq!(im_of[ip], ip - start[ia]);
    }

    // -l <= m <= l everywhere
    let l_of = paw_cell.get_iprj_to_l();
    let m_of = paw_cell.get_iprj_to_m();

    for ip in 0..nproj_tot {
        let l = l_of[ip] as i32;
        assert!(-l <= m_of[ip] && m_of[ip] <= l);
    }

    // channel boundaries reconstructed from iprj_to_il: each channel is a
    // contiguous run of 2l+1 entries with m = -l..=l ascending
    let il_of = paw_cell.get_iprj_to_il();

    let mut ip = 0;
    while ip < nproj_tot {
        let (ia, il, l) = (ia_of[ip], il_of[ip], l_of[ip]);

        for (k, m) in utility::get_quant_num_m(l).into_iter().enumerate() {
            assert_eq!(ia_of[ip + k], ia);
            assert_eq!(il_of[ip + k], il);
            assert_eq!(l_of[ip + k], l);
            assert_eq!(m_of[ip + k], m);
        }

        ip += 2 * l + 1;
    }
}

#[test]
fn test_init_rejects_bad_parameters() {
    let files = fixture_filenames();
    let coords = vec![Vector3f64::zeros()];

    assert!(matches!(
        PawCell::init(0.0, 1.2, 1.0, &[0], &coords, &files, &JthFixtureSource),
        Err(PawError::BadParameter { name: "ecut", .. })
    ));

    assert!(matches!(
        PawCell::init(50.0, 0.5, 1.0, &[0], &coords, &files, &JthFixtureSource),
        Err(PawError::BadParameter {
            name: "cell_factor",
            ..
        })
    ));

    assert!(matches!(
        PawCell::init(50.0, 1.2, -1.0, &[0], &coords, &files, &JthFixtureSource),
        Err(PawError::BadParameter { name: "omega", .. })
    ));

    assert!(matches!(
        PawCell::init(50.0, 1.2, 1.0, &[], &[], &files, &JthFixtureSource),
        Err(PawError::BadParameter { name: "nat", .. })
    ));

    assert!(matches!(
        PawCell::init(50.0, 1.2, 1.0, &[3], &coords, &files, &JthFixtureSource),
        Err(PawError::AtomTypeOutOfRange {
            ia: 0,
            itype: 3,
            ntyp: 3
        })
    ));

    assert!(matches!(
        PawCell::init(50.0, 1.2, 1.0, &[0, 0], &coords, &files, &JthFixtureSource),
        Err(PawError::AtomCountMismatch { nat: 2, ncoord: 1 })
    ));

    let bad_files = vec!["Xx.UNKNOWN.xml".to_string()];
    assert!(matches!(
        PawCell::init(50.0, 1.2, 1.0, &[0], &coords, &bad_files, &JthFixtureSource),
        Err(PawError::SpecSource { .. })
    ));
}

// a channel beyond the radial-transform order must fail at init, not later
// inside set_paw_k
struct HighLSource;

impl ProjectorSpecSource for HighLSource {
    fn read_spec(&self, _filename: &str) -> Result<AtomTypeProjectorSpec, PawError> {
        let rad = vec![0.0, 0.1, 0.2];
        let rab = vec![0.1; 3];

        Ok(AtomTypeProjectorSpec {
            symbol: "Xx".to_string(),
            rad,
            rab: rab.clone(),
            channels: vec![
                ProjectorChannel {
                    n: Some(1),
                    l: 0,
                    beta: rab.clone(),
                },
                ProjectorChannel {
                    n: None,
                    l: 5,
                    beta: rab,
                },
            ],
        })
    }
}

#[test]
fn test_init_rejects_unsupported_channel_order() {
    let files = vec!["Xx.fake.xml".to_string()];
    let coords = vec![Vector3f64::zeros()];

    assert!(matches!(
        PawCell::init(50.0, 1.2, 1.0, &[0], &coords, &files, &HighLSource),
        Err(PawError::ChannelOrderUnsupported { l: 5, .. })
    ));
}

// two hydrogen atoms in a cubic box
fn hydrogen_cell(ecut: f64) -> (PawCell, Lattice) {
    let a = 6.0;
    let latt = Lattice::new(&[a, 0.0, 0.0], &[0.0, a, 0.0], &[0.0, 0.0, a]);

    let files = vec!["H.LDA_PW-JTH.xml".to_string()];
    let atom_type = [0, 0];
    let atom_coord = [
        Vector3f64::zeros(),
        Vector3f64::new(0.5, 0.5, 0.5),
    ];

    let cell = PawCell::init(
        ecut,
        1.0,
        latt.volume(),
        &atom_type,
        &atom_coord,
        &files,
        &JthFixtureSource,
    )
    .unwrap();

    (cell, latt)
}

fn fake_wavefunctions(npw: usize, nbands: usize) -> Matrix<c64> {
    let mut wfc = Matrix::<c64>::new(npw, nbands);

    for n in 0..nbands {
        for g in 0..npw {
            let t = 0.3 * g as f64 + 1.7 * n as f64;

            wfc[[g, n]] = c64::new(t.sin(), (0.5 * t).cos()) / (npw as f64).sqrt();
        }
    }

    wfc
}

#[test]
fn test_set_paw_k_builds_cache() {
    let (mut cell, latt) = hydrogen_cell(4.0);

    assert_eq!(cell.get_cached_npw(), None);

    cell.set_paw_k(Vector3f64::zeros(), &latt).unwrap();

    let npw = cell.get_cached_npw().unwrap();
    assert!(npw > 0);
    assert_eq!(cell.get_cached_k().unwrap(), Vector3f64::zeros());
}

#[test]
fn test_set_paw_k_replaces_cache() {
    let (mut cell, latt) = hydrogen_cell(4.0);

    cell.set_paw_k(Vector3f64::zeros(), &latt).unwrap();
    let npw_gamma = cell.get_cached_npw().unwrap();

    let xk = Vector3f64::new(0.3, 0.1, -0.2);
    cell.set_paw_k(xk, &latt).unwrap();

    assert_eq!(cell.get_cached_k().unwrap(), xk);

    // still a sane grid for the shifted k-point
    let npw_shifted = cell.get_cached_npw().unwrap();
    assert!(npw_shifted > 0);
    assert!(npw_shifted as f64 > 0.5 * npw_gamma as f64);
}

#[test]
fn test_accumulate_rhoij_hermitian_and_additive() {
    let (mut cell, latt) = hydrogen_cell(4.0);

    cell.set_paw_k(Vector3f64::zeros(), &latt).unwrap();

    let npw = cell.get_cached_npw().unwrap();
    let occ = [2.0, 1.0];
    let wfc = fake_wavefunctions(npw, 2);

    cell.accumulate_rhoij(&occ, &wfc).unwrap();

    let ms = cell.get_mstate(0);
    assert_eq!(ms, 5);

    let first: Vec<Matrix<c64>> = cell.get_rhoij().to_vec();
    assert_eq!(first.len(), 2);

    let mut nonzero = false;

    for block in first.iter() {
        assert_eq!(block.get_nrow(), ms);
        assert!(block.is_hermitian(EPS10));

        for i in 0..ms {
            // diagonal entries are occupation-weighted norms
            assert!(block[[i, i]].im.abs() < EPS10);
            assert!(block[[i, i]].re >= 0.0);

            nonzero = nonzero || block[[i, i]].re > EPS16;
        }
    }

    assert!(nonzero);

    // second accumulation doubles every entry
    cell.accumulate_rhoij(&occ, &wfc).unwrap();

    for (block, prev) in cell.get_rhoij().iter().zip(first.iter()) {
        for i in 0..ms {
            for j in 0..ms {
                let d = block[[i, j]] - 2.0 * prev[[i, j]];
                assert!(d.norm() < EPS10);
            }
        }
    }

    // reset clears the accumulator
    cell.reset_rhoij();

    for block in cell.get_rhoij() {
        for v in block.as_slice() {
            assert_eq!(*v, ZERO_C64);
        }
    }
}

#[test]
fn test_accumulate_rhoij_errors() {
    let (mut cell, latt) = hydrogen_cell(4.0);

    let wfc = Matrix::<c64>::new(10, 1);

    assert!(matches!(
        cell.accumulate_rhoij(&[1.0], &wfc),
        Err(PawError::KPointNotSet)
    ));

    cell.set_paw_k(Vector3f64::zeros(), &latt).unwrap();

    let npw = cell.get_cached_npw().unwrap();

    let wfc = fake_wavefunctions(npw, 2);
    assert!(matches!(
        cell.accumulate_rhoij(&[1.0], &wfc),
        Err(PawError::BandCountMismatch { nocc: 1, nbands: 2 })
    ));

    let wfc = fake_wavefunctions(npw + 1, 2);
    assert!(matches!(
        cell.accumulate_rhoij(&[1.0, 1.0], &wfc),
        Err(PawError::CoefficientLengthMismatch { .. })
    ));
}

#[test]
fn test_spec_validation() {
    let spec = AtomTypeProjectorSpec {
        symbol: "Xx".to_string(),
        rad: vec![0.0, 0.1],
        rab: vec![0.1, 0.1],
        channels: Vec::new(),
    };

    assert!(matches!(
        spec.validate(),
        Err(PawError::EmptySpec { .. })
    ));

    let spec = AtomTypeProjectorSpec {
        symbol: "Xx".to_string(),
        rad: vec![0.0, 0.1],
        rab: vec![0.1],
        channels: vec![ProjectorChannel {
            n: Some(1),
            l: 0,
            beta: vec![0.0, 0.1],
        }],
    };

    assert!(matches!(
        spec.validate(),
        Err(PawError::RadialGridMismatch { .. })
    ));

    let spec = AtomTypeProjectorSpec {
        symbol: "Xx".to_string(),
        rad: vec![0.0, 0.1],
        rab: vec![0.1, 0.1],
        channels: vec![ProjectorChannel {
            n: None,
            l: 6,
            beta: vec![0.0, 0.1],
        }],
    };

    assert!(matches!(
        spec.validate(),
        Err(PawError::ChannelOrderUnsupported { l: 6, .. })
    ));

    let spec = AtomTypeProjectorSpec {
        symbol: "H".to_string(),
        rad: vec![0.0, 0.1],
        rab: vec![0.1, 0.1],
        channels: vec![ProjectorChannel {
            n: None,
            l: 1,
            beta: vec![0.0, 0.1],
        }],
    };

    assert!(spec.validate().is_ok());
    assert_eq!(spec.mstate(), 3);
    assert_eq!(spec.lmax(), 1);
}
