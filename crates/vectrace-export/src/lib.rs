//! vectrace-export: Pure format serializers (sans-IO)
//!
//! Converts traced outlines into SVG markup and packages finished markup
//! into downloadable artifacts. Nothing here touches the filesystem.

pub mod artifact;
pub mod svg;

pub use crate::artifact::{ExportArtifact, SVG_EXTENSION, SVG_MIME_TYPE, suggested_file_name};
pub use crate::svg::{SvgMetadata, build_path_data, to_svg};
