//! Markup extraction for the job board.
//!
//! Inherently brittle glue tied to one website's current markup: the board
//! index yields candidate offer links, and each offer page yields a
//! structured [`jobsift_core::JobOffer`]. Extraction failures are isolated
//! per listing and never abort a pipeline run.

pub mod links;
pub mod offer;

pub use links::extract_board_links;
pub use offer::{BoardMarkupExtractor, OfferExtractor, extract_offer};
