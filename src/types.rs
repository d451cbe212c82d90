// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Core Types
 * Queries, per-source results and flattened output rows
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use crate::errors::FinderResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Which query field a source consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Domain,
    Ip,
}

/// How a relation was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationMethod {
    Api,
    Cert,
    Crawl,
}

impl RelationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationMethod::Api => "api",
            RelationMethod::Cert => "cert",
            RelationMethod::Crawl => "crawl",
        }
    }
}

impl fmt::Display for RelationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What kind of relation was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationType {
    Subdomain,
    RelatedDomain,
    Reverse,
}

impl RelationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationType::Subdomain => "subdomain",
            RelationType::RelatedDomain => "related-domain",
            RelationType::Reverse => "reverse",
        }
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One input item; `domain` feeds domain-serving sources, `ip` feeds IP-serving ones
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub domain: Option<String>,
    pub ip: Option<String>,
}

impl Query {
    pub fn domain(domain: impl Into<String>) -> Self {
        Self {
            domain: Some(domain.into()),
            ip: None,
        }
    }

    pub fn with_ip(domain: impl Into<String>, ip: impl Into<String>) -> Self {
        Self {
            domain: Some(domain.into()),
            ip: Some(ip.into()),
        }
    }

    /// Field consumed by a source of the given input kind
    pub fn target(&self, kind: InputKind) -> Option<&str> {
        match kind {
            InputKind::Domain => self.domain.as_deref(),
            InputKind::Ip => self.ip.as_deref(),
        }
    }
}

/// Outcome of one query against one source
#[derive(Debug, Clone)]
pub struct QueryResult {
    pub domain: String,
    pub ip: Option<String>,
    pub outcome: FinderResult<Vec<String>>,
    /// e.g. `cert/crtsh`
    pub relation_method: String,
    pub relation_type: RelationType,
    pub input_kind: InputKind,
}

/// One json line of output: a single discovered name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub root_domain: String,
    pub domain: String,
    pub method: String,
    #[serde(rename = "type")]
    pub relation_type: RelationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_info: Option<BTreeMap<String, String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_record_json_shape() {
        let record = OutputRecord {
            root_domain: "abc.com".to_string(),
            domain: "mail.abc.com".to_string(),
            method: "api/hackertarget".to_string(),
            relation_type: RelationType::Subdomain,
            extra_info: None,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"root_domain":"abc.com","domain":"mail.abc.com","method":"api/hackertarget","type":"subdomain"}"#
        );
    }

    #[test]
    fn test_output_record_with_ip() {
        let record = OutputRecord {
            root_domain: "x.com".to_string(),
            domain: "abc.x.com".to_string(),
            method: "api/sonarsearch/reverse".to_string(),
            relation_type: RelationType::Reverse,
            extra_info: Some(BTreeMap::from([("ip".to_string(), "1.2.1.2".to_string())])),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], "reverse");
        assert_eq!(value["extra_info"]["ip"], "1.2.1.2");
    }

    #[test]
    fn test_query_target_selection() {
        let query = Query::with_ip("abc.com", "1.2.1.2");
        assert_eq!(query.target(InputKind::Domain), Some("abc.com"));
        assert_eq!(query.target(InputKind::Ip), Some("1.2.1.2"));
        assert_eq!(Query::domain("abc.com").target(InputKind::Ip), None);
    }

    #[test]
    fn test_relation_type_serde_names() {
        assert_eq!(
            serde_json::to_string(&RelationType::RelatedDomain).unwrap(),
            "\"related-domain\""
        );
        assert_eq!(RelationMethod::Cert.to_string(), "cert");
    }
}
