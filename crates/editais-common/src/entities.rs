/// Core entity types for the editais catalog.
/// These are the canonical, flattened shapes produced by the normalizer;
/// nothing in here carries untyped JSON.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Defaults applied during normalization
// ---------------------------------------------------------------------------

pub const DEFAULT_TITLE: &str = "Edital sem título";
pub const DEFAULT_DESCRIPTION: &str = "Sem descrição disponível.";
pub const DEFAULT_REGION: &str = "BR";
pub const DEFAULT_CATEGORY: &str = "Geral";
pub const NOT_INFORMED: &str = "Não informado";

// ---------------------------------------------------------------------------
// Attachment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub url: String,
}

// ---------------------------------------------------------------------------
// Notice (Edital)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub id: String,
    pub title: String,
    pub description: String,
    pub region: String,
    pub category: String,
    pub support_type: String,
    pub notice_type: String,
    /// `YYYY-MM-DD`
    pub closing_date: Option<String>,
    /// `YYYY-MM-DD`
    pub opening_date: Option<String>,
    pub tags: Vec<String>,
    pub attachments: Vec<Attachment>,
    pub share_link: Option<String>,
    pub total_value: Option<String>,
    pub target_audience: Option<String>,
    pub institution: Option<String>,
    pub icon: Option<String>,
}

impl Notice {
    /// Date used for range filtering: closing date, else opening date.
    pub fn reference_date(&self) -> Option<&str> {
        self.closing_date
            .as_deref()
            .or(self.opening_date.as_deref())
    }

    /// The value of one categorical field.
    pub fn facet_value(&self, facet: Facet) -> &str {
        match facet {
            Facet::Region      => &self.region,
            Facet::Category    => &self.category,
            Facet::SupportType => &self.support_type,
            Facet::NoticeType  => &self.notice_type,
        }
    }
}

// ---------------------------------------------------------------------------
// Facet
// ---------------------------------------------------------------------------

/// A categorical field exposed as a multi-select filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facet {
    Region,
    Category,
    SupportType,
    NoticeType,
}

impl Facet {
    pub const ALL: [Facet; 4] = [
        Facet::Region,
        Facet::Category,
        Facet::SupportType,
        Facet::NoticeType,
    ];

    /// Query-string key for this facet.
    pub fn as_str(&self) -> &'static str {
        match self {
            Facet::Region      => "region",
            Facet::Category    => "category",
            Facet::SupportType => "support_type",
            Facet::NoticeType  => "notice_type",
        }
    }

    /// Label shown above the facet's checkboxes.
    pub fn label(&self) -> &'static str {
        match self {
            Facet::Region      => "Região",
            Facet::Category    => "Categoria",
            Facet::SupportType => "Tipo de apoio",
            Facet::NoticeType  => "Tipo de edital",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "region"       => Some(Facet::Region),
            "category"     => Some(Facet::Category),
            "support_type" => Some(Facet::SupportType),
            "notice_type"  => Some(Facet::NoticeType),
            _              => None,
        }
    }
}
