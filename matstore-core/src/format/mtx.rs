//! MatrixMarket header definitions

/// Storage layout declared in the banner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MtxLayout {
    /// `coordinate`: one `row col [value]` line per stored entry
    Coordinate,
    /// `array`: every value, column-major
    Array,
}

/// Value field declared in the banner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MtxField {
    Real,
    Integer,
    /// No value column; every stored entry is 1
    Pattern,
}

/// Symmetry declared in the banner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MtxSymmetry {
    General,
    /// Only the lower triangle is stored; (j, i) mirrors (i, j)
    Symmetric,
    /// Only the strict lower triangle is stored; (j, i) = -(i, j)
    SkewSymmetric,
}

/// Parsed `%%MatrixMarket` banner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MtxHeader {
    pub layout: MtxLayout,
    pub field: MtxField,
    pub symmetry: MtxSymmetry,
}

impl MtxHeader {
    /// Banner prefix every MatrixMarket file starts with
    pub const BANNER: &'static str = "%%MatrixMarket";

    /// Header written for coordinate real general output
    pub const COORDINATE_REAL: Self = Self {
        layout: MtxLayout::Coordinate,
        field: MtxField::Real,
        symmetry: MtxSymmetry::General,
    };

    /// Banner line (without newline) written for coordinate real output
    pub const COORDINATE_REAL_BANNER: &'static str = "%%MatrixMarket matrix coordinate real general";

    /// Whether stored entries imply a mirrored partner
    pub const fn is_mirrored(&self) -> bool {
        !matches!(self.symmetry, MtxSymmetry::General)
    }
}
