// src/jurisdiction.rs
//! The fixed set of jurisdictions the listing/detail parsers are tuned for.
//! Anything else is rejected before a single request goes out.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::ScrapeError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Jurisdiction {
    NewJersey,
    NewYork,
    Pennsylvania,
    Texas,
    California,
    Florida,
}

impl Jurisdiction {
    pub const ALL: [Jurisdiction; 6] = [
        Jurisdiction::NewJersey,
        Jurisdiction::NewYork,
        Jurisdiction::Pennsylvania,
        Jurisdiction::Texas,
        Jurisdiction::California,
        Jurisdiction::Florida,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Jurisdiction::NewJersey => "NJ",
            Jurisdiction::NewYork => "NY",
            Jurisdiction::Pennsylvania => "PA",
            Jurisdiction::Texas => "TX",
            Jurisdiction::California => "CA",
            Jurisdiction::Florida => "FL",
        }
    }

    /// Path segment on the source site.
    pub fn slug(self) -> &'static str {
        match self {
            Jurisdiction::NewJersey => "new-jersey",
            Jurisdiction::NewYork => "new-york",
            Jurisdiction::Pennsylvania => "pennsylvania",
            Jurisdiction::Texas => "texas",
            Jurisdiction::California => "california",
            Jurisdiction::Florida => "florida",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Jurisdiction::NewJersey => "New Jersey",
            Jurisdiction::NewYork => "New York",
            Jurisdiction::Pennsylvania => "Pennsylvania",
            Jurisdiction::Texas => "Texas",
            Jurisdiction::California => "California",
            Jurisdiction::Florida => "Florida",
        }
    }

    pub fn listing_url(self, base_url: &str) -> String {
        format!("{}/{}/scratch-offs", base_url.trim_end_matches('/'), self.slug())
    }

    pub fn supported_codes() -> String {
        Self::ALL.iter().map(|j| j.code()).collect::<Vec<_>>().join(", ")
    }
}

impl FromStr for Jurisdiction {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|j| j.code().eq_ignore_ascii_case(code) || j.slug().eq_ignore_ascii_case(code))
            .ok_or_else(|| ScrapeError::UnsupportedJurisdiction {
                code: code.to_string(),
                supported: Self::supported_codes(),
            })
    }
}

impl fmt::Display for Jurisdiction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for Jurisdiction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}
