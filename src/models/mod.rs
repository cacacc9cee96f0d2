pub mod profile;
pub mod recommendation;
pub mod tier;

pub use profile::{normalize, validate_pair, BlendRequest, ProfileLocator, PROFILE_BASE_URL};
pub use recommendation::{RankedResultSet, RecommendationItem, SubScores};
pub use tier::{tier_of, Tier};
