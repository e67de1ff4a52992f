//! Reference tables used to tag posts and contexts.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

use crate::entity::named_entity;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    #[serde(rename = "_id", alias = "id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub region_name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

named_entity!(Region, collection = "regions", label = "region", name = region_name);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    #[serde(rename = "_id", alias = "id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub country_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

named_entity!(Country, collection = "countries", label = "country", name = country_name);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sector {
    #[serde(rename = "_id", alias = "id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub sector_name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

named_entity!(Sector, collection = "sectors", label = "sector", name = sector_name);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubSector {
    #[serde(rename = "_id", alias = "id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub sub_sector_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

named_entity!(
    SubSector,
    collection = "sub-sectors",
    label = "sub-sector",
    name = sub_sector_name
);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    #[serde(rename = "_id", alias = "id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub signal_name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

named_entity!(Signal, collection = "signals", label = "signal", name = signal_name);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubSignal {
    #[serde(rename = "_id", alias = "id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub sub_signal_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

named_entity!(
    SubSignal,
    collection = "sub-signals",
    label = "sub-signal",
    name = sub_signal_name
);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    #[serde(rename = "_id", alias = "id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub theme_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_description: Option<String>,
    #[serde(default)]
    pub sectors: Vec<String>,
    #[serde(default)]
    pub sub_sectors: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

named_entity!(
    Theme,
    collection = "themes",
    label = "theme",
    name = theme_title,
    search = [theme_description]
);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    #[serde(rename = "_id", alias = "id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_description: Option<String>,
    #[serde(default)]
    pub sectors: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

named_entity!(
    Company,
    collection = "companies",
    label = "company",
    name = company_name,
    search = [company_description]
);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    #[serde(rename = "_id", alias = "id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub source_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

named_entity!(
    Source,
    collection = "sources",
    label = "source",
    name = source_name,
    search = [source_url]
);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketData {
    #[serde(rename = "_id", alias = "id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<OffsetDateTime>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

named_entity!(
    MarketData,
    collection = "market-data",
    label = "market data entry",
    name = title,
    search = [source, unit]
);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRefiner {
    #[serde(rename = "_id", alias = "id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub refiners: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

named_entity!(
    QueryRefiner,
    collection = "query-refiners",
    label = "query refiner",
    name = query
);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClarificationGuidance {
    #[serde(rename = "_id", alias = "id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidance: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

named_entity!(
    ClarificationGuidance,
    collection = "clarification-guidance",
    label = "clarification guidance",
    name = question,
    search = [guidance]
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Entity;

    #[test]
    fn region_accepts_mongo_style_id_and_keeps_unknown_fields() {
        let region: Region =
            serde_json::from_str(r#"{"_id":"r1","regionName":"Europe","__v":0}"#).expect("region");
        assert_eq!(region.id(), "r1");
        assert_eq!(region.display_name(), "Europe");

        let back = serde_json::to_value(&region).expect("serialize");
        assert_eq!(back["_id"], "r1");
        assert_eq!(back["__v"], 0);
    }

    #[test]
    fn new_records_serialize_without_id() {
        let sector = Sector {
            sector_name: "Energy".into(),
            ..Sector::default()
        };
        let value = serde_json::to_value(&sector).expect("serialize");
        assert!(value.get("_id").is_none());
        assert_eq!(value["sectorName"], "Energy");
    }

    #[test]
    fn blank_name_is_reported_missing() {
        let theme = Theme {
            theme_title: "   ".into(),
            ..Theme::default()
        };
        assert_eq!(theme.missing_fields(), vec!["theme_title"]);
    }

    #[test]
    fn search_covers_optional_columns() {
        let company = Company {
            company_name: "Acme".into(),
            company_description: Some("Rocket skates".into()),
            ..Company::default()
        };
        assert!(company.matches("ROCKET"));
        assert!(company.matches("acme"));
        assert!(!company.matches("anvil"));
    }
}
