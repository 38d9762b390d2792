use special::DomainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PawError {
    #[error("invalid parameter {name} = {value}")]
    BadParameter { name: &'static str, value: f64 },

    #[error("atom {ia} has type index {itype}, but only {ntyp} species are defined")]
    AtomTypeOutOfRange {
        ia: usize,
        itype: usize,
        ntyp: usize,
    },

    #[error("atom count mismatch: {nat} types vs {ncoord} coordinates")]
    AtomCountMismatch { nat: usize, ncoord: usize },

    #[error("projector spec source '{filename}': {reason}")]
    SpecSource { filename: String, reason: String },

    #[error("species '{symbol}' defines no projector channels")]
    EmptySpec { symbol: String },

    #[error("species '{symbol}' has inconsistent radial grid lengths")]
    RadialGridMismatch { symbol: String },

    #[error(
        "species '{symbol}' has a channel with l = {l}; the radial transform \
         supports l <= {lmax}"
    )]
    ChannelOrderUnsupported { symbol: String, l: usize, lmax: usize },

    #[error("no k-point grid cached; call set_paw_k first")]
    KPointNotSet,

    #[error("occupation count {nocc} does not match {nbands} wavefunction columns")]
    BandCountMismatch { nocc: usize, nbands: usize },

    #[error("wavefunction rows {nrow} do not match the cached {npw} plane waves")]
    CoefficientLengthMismatch { nrow: usize, npw: usize },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// One radial projector channel. `n` is absent for unbound/scattering states;
/// that changes nothing in the indexing, only the physical label.
#[derive(Debug, Clone)]
pub struct ProjectorChannel {
    pub n: Option<u32>,
    pub l: usize,
    pub beta: Vec<f64>,
}

/// Projector channels of one species, in file order, together with the radial
/// grid they are tabulated on (`rab` holds the dr/di integration weights).
#[derive(Debug, Clone)]
pub struct AtomTypeProjectorSpec {
    pub symbol: String,
    pub rad: Vec<f64>,
    pub rab: Vec<f64>,
    pub channels: Vec<ProjectorChannel>,
}

impl AtomTypeProjectorSpec {
    /// Number of projectors of one atom of this species: sum of 2l+1.
    pub fn mstate(&self) -> usize {
        self.channels.iter().map(|ch| 2 * ch.l + 1).sum()
    }

    pub fn lmax(&self) -> usize {
        self.channels.iter().map(|ch| ch.l).max().unwrap_or(0)
    }

    pub fn validate(&self) -> Result<(), PawError> {
        if self.channels.is_empty() {
            return Err(PawError::EmptySpec {
                symbol: self.symbol.clone(),
            });
        }

        if self.rad.len() != self.rab.len() {
            return Err(PawError::RadialGridMismatch {
                symbol: self.symbol.clone(),
            });
        }

        for ch in self.channels.iter() {
            if ch.beta.len() != self.rad.len() {
                return Err(PawError::RadialGridMismatch {
                    symbol: self.symbol.clone(),
                });
            }

            // the form-factor transform needs j_l for this channel
            if ch.l > special::JN_NMAX {
                return Err(PawError::ChannelOrderUnsupported {
                    symbol: self.symbol.clone(),
                    l: ch.l,
                    lmax: special::JN_NMAX,
                });
            }
        }

        Ok(())
    }
}

/// Parsing seam: whoever owns the pseudopotential file format turns one file
/// into an `AtomTypeProjectorSpec`. The cell only consumes the parsed value.
pub trait ProjectorSpecSource {
    fn read_spec(&self, filename: &str) -> Result<AtomTypeProjectorSpec, PawError>;
}
