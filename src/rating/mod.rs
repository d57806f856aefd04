// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Final rating types and tolerant parsing of model output

mod parser;
mod types;

pub use parser::{parse_rating_response, ParsedRating};
pub use types::{EmbeddedRating, FinalRating, RatingSource, SourceRef};
