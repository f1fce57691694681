//! Test utilities for vantage-core
//!
//! Builders and a small sample dataset shared by the core, server and CLI
//! test suites.

use std::path::{Path, PathBuf};

use crate::models::Insight;

/// Start building an insight with the given id and every other field unset
pub fn insight(id: &str) -> InsightBuilder {
    InsightBuilder(Insight {
        id: id.to_string(),
        ..Default::default()
    })
}

/// Fluent builder for test records
pub struct InsightBuilder(Insight);

impl InsightBuilder {
    pub fn end_year(mut self, v: &str) -> Self {
        self.0.end_year = v.to_string();
        self
    }
    pub fn start_year(mut self, v: &str) -> Self {
        self.0.start_year = v.to_string();
        self
    }
    pub fn topic(mut self, v: &str) -> Self {
        self.0.topic = v.to_string();
        self
    }
    pub fn sector(mut self, v: &str) -> Self {
        self.0.sector = v.to_string();
        self
    }
    pub fn region(mut self, v: &str) -> Self {
        self.0.region = v.to_string();
        self
    }
    pub fn pestle(mut self, v: &str) -> Self {
        self.0.pestle = v.to_string();
        self
    }
    pub fn source(mut self, v: &str) -> Self {
        self.0.source = v.to_string();
        self
    }
    pub fn country(mut self, v: &str) -> Self {
        self.0.country = v.to_string();
        self
    }
    pub fn title(mut self, v: &str) -> Self {
        self.0.title = v.to_string();
        self
    }
    pub fn insight_text(mut self, v: &str) -> Self {
        self.0.insight = v.to_string();
        self
    }
    pub fn added(mut self, v: &str) -> Self {
        self.0.added = v.to_string();
        self
    }
    pub fn published(mut self, v: &str) -> Self {
        self.0.published = v.to_string();
        self
    }
    pub fn intensity(mut self, v: f64) -> Self {
        self.0.intensity = Some(v);
        self
    }
    pub fn likelihood(mut self, v: f64) -> Self {
        self.0.likelihood = Some(v);
        self
    }
    pub fn relevance(mut self, v: f64) -> Self {
        self.0.relevance = Some(v);
        self
    }
    pub fn build(self) -> Insight {
        self.0
    }
}

/// A small dataset resembling the production export
///
/// Contains duplicate topics/countries for grouping, blank fields for the
/// "unset" rules, and records without scores.
pub fn sample_insights() -> Vec<Insight> {
    vec![
        insight("5d8d1a1b")
            .end_year("2027")
            .intensity(6.0)
            .likelihood(3.0)
            .relevance(2.0)
            .sector("Energy")
            .topic("gas")
            .insight_text("Annual Energy Outlook")
            .region("Northern America")
            .country("United States of America")
            .pestle("Industries")
            .source("EIA")
            .title("U.S. natural gas consumption is expected to increase.")
            .added("January, 20 2017 03:51:25")
            .published("January, 09 2017 00:00:00")
            .build(),
        insight("5d8d1a1c")
            .intensity(6.0)
            .likelihood(3.0)
            .relevance(2.0)
            .sector("Energy")
            .topic("oil")
            .insight_text("Annual Energy Outlook")
            .region("Northern America")
            .country("United States of America")
            .pestle("Industries")
            .source("EIA")
            .title("Reference case U.S. crude oil production is projected to remain flat.")
            .added("January, 20 2017 03:51:24")
            .published("January, 09 2017 00:00:00")
            .build(),
        insight("5d8d1a1d")
            .end_year("2018")
            .intensity(48.0)
            .likelihood(4.0)
            .relevance(3.0)
            .sector("Energy")
            .topic("oil")
            .insight_text("Oil prices rebound")
            .region("World")
            .pestle("Economic")
            .source("Reuters")
            .title("Crude OIL demand growth to slow in 2018.")
            .added("August, 11 2017 12:00:00")
            .build(),
        insight("5d8d1a1e")
            .end_year("2022")
            .intensity(2.0)
            .likelihood(2.0)
            .relevance(1.0)
            .sector("Manufacturing")
            .topic("market")
            .insight_text("Robotics market")
            .region("Asia")
            .country("Japan")
            .pestle("Technological")
            .source("Robotics Business Review")
            .title("Industrial robot sales will climb.")
            .added("March, 02 2018 10:00:00")
            .build(),
        insight("5d8d1a1f")
            .sector("Government")
            .topic("policy")
            .insight_text("Election year outlook")
            .region("Europe")
            .country("Germany")
            .pestle("Political")
            .source("Guardian")
            .title("Coalition talks continue.")
            .added("not a date")
            .build(),
        insight("5d8d1a20")
            .end_year("2030")
            .intensity(16.0)
            .likelihood(4.0)
            .relevance(4.0)
            .topic("oil")
            .insight_text("Shale output")
            .region("Northern America")
            .country("United States of America")
            .pestle("Economic")
            .source("EIA")
            .title("Shale production climbs.")
            .added("February, 14 2017 08:30:00")
            .build(),
        insight("5d8d1a21")
            .end_year("2018")
            .intensity(4.0)
            .likelihood(2.0)
            .relevance(2.0)
            .sector("Financial services")
            .topic("market")
            .insight_text("Bank lending")
            .region("Asia")
            .country("India")
            .pestle("Economic")
            .source("Reuters")
            .title("Credit growth slows.")
            .added("January, 20 2017 03:51:25")
            .build(),
    ]
}

/// Write records as a JSON dataset file, returning its path
pub fn write_dataset(dir: &Path, insights: &[Insight]) -> PathBuf {
    let path = dir.join("insights.json");
    let json = serde_json::to_string_pretty(insights).expect("serialize dataset");
    std::fs::write(&path, json).expect("write dataset");
    path
}
