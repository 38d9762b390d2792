//! Export drivers for sparse Hamiltonian / overlap / kinetic / dH matrices.
//!
//! The matrix assembly and the on-disk framing both live behind traits; this
//! crate only owns the call contract: threshold filtering, spin-channel
//! routing and the basis-index resolution shared with the PAW projector
//! index.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use thiserror::Error;
use tracing::info;
use types::c64;

#[derive(Debug, Error)]
pub enum HsOutputError {
    #[error("matrix producer: {0}")]
    Producer(String),

    #[error("spin count {0} is not one of 1, 2, 4")]
    BadSpinCount(usize),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// One spin channel of a matrix in coordinate form. Entries with
/// |value| <= threshold are dropped at insertion time.
#[derive(Debug, Clone)]
pub struct SparseMatrixR {
    nbasis: usize,
    threshold: f64,
    entries: Vec<(usize, usize, c64)>,
}

impl SparseMatrixR {
    pub fn new(nbasis: usize, threshold: f64) -> SparseMatrixR {
        SparseMatrixR {
            nbasis,
            threshold,
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, i: usize, j: usize, v: c64) {
        if v.norm() > self.threshold {
            self.entries.push((i, j, v));
        }
    }

    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn get_nbasis(&self) -> usize {
        self.nbasis
    }

    pub fn get_threshold(&self) -> f64 {
        self.threshold
    }

    pub fn get_entries(&self) -> &[(usize, usize, c64)] {
        self.entries.as_slice()
    }
}

/// Resolution of a basis index to the atom and projector channel owning it,
/// backed by the same index arrays the PAW cell builds.
pub trait BasisMap {
    fn basis_to_atom(&self, ibasis: usize) -> usize;
    fn basis_to_channel(&self, ibasis: usize) -> usize;
}

impl BasisMap for pawcell::PawCell {
    fn basis_to_atom(&self, ibasis: usize) -> usize {
        self.get_iprj_to_ia()[ibasis]
    }

    fn basis_to_channel(&self, ibasis: usize) -> usize {
        self.get_iprj_to_il()[ibasis]
    }
}

/// Assembles one requested matrix per call. `ispin` selects the spin channel
/// for spin-dependent matrices; the overlap and kinetic matrices carry none.
pub trait HsrProducer: BasisMap {
    fn get_nbasis(&self) -> usize;

    /// 1, 2 or 4 (non-polarized, collinear, non-collinear)
    fn get_nspin(&self) -> usize;

    fn overlap_sparse(&mut self, threshold: f64) -> Result<SparseMatrixR, HsOutputError>;

    fn kinetic_sparse(&mut self, threshold: f64) -> Result<SparseMatrixR, HsOutputError>;

    fn hamiltonian_sparse(
        &mut self,
        ispin: usize,
        threshold: f64,
    ) -> Result<SparseMatrixR, HsOutputError>;

    fn hamiltonian_diff_sparse(
        &mut self,
        ispin: usize,
        threshold: f64,
    ) -> Result<SparseMatrixR, HsOutputError>;
}

/// On-disk framing (text vs. binary layout) is entirely the writer's concern.
pub trait SparseMatrixWriter {
    fn write(
        &mut self,
        path: &Path,
        binary: bool,
        matrix: &SparseMatrixR,
    ) -> Result<(), HsOutputError>;
}

/// Default writer: one `i j re im` line per entry after a `nbasis nnz`
/// header, or the same layout as little-endian records when `binary` is set.
#[derive(Debug, Default)]
pub struct FileSparseWriter;

impl SparseMatrixWriter for FileSparseWriter {
    fn write(
        &mut self,
        path: &Path,
        binary: bool,
        matrix: &SparseMatrixR,
    ) -> Result<(), HsOutputError> {
        let mut out = BufWriter::new(File::create(path)?);

        if binary {
            out.write_all(&(matrix.get_nbasis() as u64).to_le_bytes())?;
            out.write_all(&(matrix.nnz() as u64).to_le_bytes())?;

            for &(i, j, v) in matrix.get_entries() {
                out.write_all(&(i as u64).to_le_bytes())?;
                out.write_all(&(j as u64).to_le_bytes())?;
                out.write_all(&v.re.to_le_bytes())?;
                out.write_all(&v.im.to_le_bytes())?;
            }
        } else {
            writeln!(out, "{} {}", matrix.get_nbasis(), matrix.nnz())?;

            for &(i, j, v) in matrix.get_entries() {
                writeln!(out, "{} {} {:.16E} {:.16E}", i, j, v.re, v.im)?;
            }
        }

        out.flush()?;

        Ok(())
    }
}

// Spin channels to drive for spin-dependent matrices: 1 and 4 collapse to a
// single channel, 2 produces an up and a down file.
fn spin_channels(nspin: usize) -> Result<&'static [usize], HsOutputError> {
    match nspin {
        1 | 4 => Ok(&[0]),
        2 => Ok(&[0, 1]),
        _ => Err(HsOutputError::BadSpinCount(nspin)),
    }
}

pub fn output_s_r(
    producer: &mut dyn HsrProducer,
    writer: &mut dyn SparseMatrixWriter,
    sr_filename: &Path,
    binary: bool,
    sparse_threshold: f64,
) -> Result<(), HsOutputError> {
    let sr = producer.overlap_sparse(sparse_threshold)?;

    writer.write(sr_filename, binary, &sr)?;

    info!(nnz = sr.nnz(), path = %sr_filename.display(), "wrote S(R)");

    Ok(())
}

pub fn output_t_r(
    producer: &mut dyn HsrProducer,
    writer: &mut dyn SparseMatrixWriter,
    tr_filename: &Path,
    binary: bool,
    sparse_threshold: f64,
) -> Result<(), HsOutputError> {
    let tr = producer.kinetic_sparse(sparse_threshold)?;

    writer.write(tr_filename, binary, &tr)?;

    info!(nnz = tr.nnz(), path = %tr_filename.display(), "wrote T(R)");

    Ok(())
}

pub fn output_hs_r(
    producer: &mut dyn HsrProducer,
    writer: &mut dyn SparseMatrixWriter,
    sr_filename: &Path,
    hr_filename_up: &Path,
    hr_filename_down: &Path,
    binary: bool,
    sparse_threshold: f64,
) -> Result<(), HsOutputError> {
    let hr_paths = [hr_filename_up, hr_filename_down];

    for &ispin in spin_channels(producer.get_nspin())? {
        let hr = producer.hamiltonian_sparse(ispin, sparse_threshold)?;

        writer.write(hr_paths[ispin], binary, &hr)?;

        info!(ispin, nnz = hr.nnz(), "wrote H(R)");
    }

    output_s_r(producer, writer, sr_filename, binary, sparse_threshold)
}

pub fn output_dh_r(
    producer: &mut dyn HsrProducer,
    writer: &mut dyn SparseMatrixWriter,
    dh_filename_up: &Path,
    dh_filename_down: &Path,
    binary: bool,
    sparse_threshold: f64,
) -> Result<(), HsOutputError> {
    let dh_paths = [dh_filename_up, dh_filename_down];

    for &ispin in spin_channels(producer.get_nspin())? {
        let dh = producer.hamiltonian_diff_sparse(ispin, sparse_threshold)?;

        writer.write(dh_paths[ispin], binary, &dh)?;

        info!(ispin, nnz = dh.nnz(), "wrote dH(R)");
    }

    Ok(())
}
