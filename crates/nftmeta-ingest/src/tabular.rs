//! Tabular normalizer
//!
//! Reads the first data row of `factory.csv` and every row of `tokens.csv`.
//! Numbered column groups are collapsed: `gallery N` into the gallery list,
//! `Att Type/Name/Desc N` into the factory attribute schema and
//! `Att Name/Val N` into token attribute values. Blank cells count as absent.

use crate::classify;
use crate::layout::{FACTORY_CSV, TOKENS_CSV};
use nftmeta_common::types::{
    AssetType, AttributeSchema, AttributeType, AttributeValue, Factory, Media, Metadata,
    SerialNumber, StaticResource, Token, TokenUriTemplate, DEFAULT_LOCALE,
};
use nftmeta_common::{DiagnosticKind, Diagnostics, NftCollection, NftError, Result};
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::path::Path;
use tracing::{debug, instrument};

/// Number of `gallery N` columns
pub const GALLERY_SLOTS: usize = 12;

/// Number of attribute column groups
pub const ATTRIBUTE_SLOTS: usize = 12;

type Row = HashMap<String, String>;

/// One CSV row plus where it came from, for error messages
struct Cells<'r> {
    file: &'r str,
    line: usize,
    row: &'r Row,
}

impl<'r> Cells<'r> {
    fn get(&self, column: &str) -> Option<&'r str> {
        self.row
            .get(column)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    fn require(&self, column: &str) -> Result<&'r str> {
        self.get(column)
            .ok_or_else(|| self.invalid(format!("missing value for column '{}'", column)))
    }

    fn invalid(&self, message: impl std::fmt::Display) -> NftError {
        NftError::invalid_document(self.file, format!("line {}: {}", self.line, message))
    }
}

fn reader(path: &Path) -> Result<csv::Reader<File>> {
    Ok(csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)?)
}

fn resource(uri: &str, diagnostics: &mut Diagnostics) -> StaticResource {
    StaticResource::from_uri(uri, classify(uri, diagnostics))
}

fn parse_metadata(cells: &Cells<'_>, diagnostics: &mut Diagnostics) -> Result<Metadata> {
    let asset_type = cells
        .get("type")
        .map(|raw| raw.parse::<AssetType>().map_err(|e| cells.invalid(e)))
        .transpose()?;

    let product = resource(cells.require("product")?, diagnostics);
    let square = resource(cells.require("square")?, diagnostics);
    let hero = cells.get("hero").map(|uri| resource(uri, diagnostics));

    let gallery: Vec<StaticResource> = (1..=GALLERY_SLOTS)
        .filter_map(|n| cells.get(&format!("gallery {}", n)))
        .map(|uri| resource(uri, diagnostics))
        .collect();

    Ok(Metadata {
        spec_version: cells.require("specVersion")?.to_string(),
        asset_type,
        name: cells.require("name")?.to_string(),
        sub_name: cells.get("subName").map(str::to_string),
        description: cells.get("description").map(str::to_string),
        author: cells.get("author").map(str::to_string),
        default_locale: cells.get("defaultLocale").unwrap_or(DEFAULT_LOCALE).to_string(),
        media: Media {
            product,
            square,
            hero,
            gallery: (!gallery.is_empty()).then_some(gallery),
        },
        properties: None,
        resources: None,
    })
}

fn parse_factory(cells: &Cells<'_>, diagnostics: &mut Diagnostics) -> Result<Factory> {
    let metadata = parse_metadata(cells, diagnostics)?;

    let token_uri_template = cells
        .get("tokenUriTemplate")
        .map(|raw| raw.parse::<TokenUriTemplate>().map_err(|e| cells.invalid(e)))
        .transpose()?;

    let mut attributes = BTreeMap::new();
    for n in 1..=ATTRIBUTE_SLOTS {
        let Some(name) = cells.get(&format!("Att Name {}", n)) else {
            continue;
        };
        let kind = cells
            .require(&format!("Att Type {}", n))?
            .parse::<AttributeType>()
            .map_err(|e| cells.invalid(e))?;

        attributes.insert(
            name.to_string(),
            AttributeSchema {
                kind,
                name: name.to_string(),
                description: cells.get(&format!("Att Desc {}", n)).map(str::to_string),
            },
        );
    }

    Ok(Factory {
        metadata,
        token_uri_template,
        attributes: (!attributes.is_empty()).then_some(attributes),
    })
}

fn parse_token(
    cells: &Cells<'_>,
    factory: &Factory,
    diagnostics: &mut Diagnostics,
) -> Result<Token> {
    let serial_number = SerialNumber::from(cells.require("serialNumber")?);
    let metadata = parse_metadata(cells, diagnostics)?;

    let mut attributes = BTreeMap::new();
    for n in 1..=ATTRIBUTE_SLOTS {
        let Some(name) = cells.get(&format!("Att Name {}", n)) else {
            continue;
        };
        let raw = cells.get(&format!("Att Val {}", n)).unwrap_or_default();
        attributes.insert(
            name.to_string(),
            AttributeValue::coerce(raw, factory.attribute_type(name)),
        );
    }

    Ok(Token {
        serial_number: Some(serial_number),
        metadata,
        attributes: (!attributes.is_empty()).then_some(attributes),
        dynamic_attributes: None,
        dynamic_resources: None,
    })
}

/// Normalize a tabular collection directory
#[instrument(skip_all, fields(dir = %dir.display()))]
pub fn parse(dir: &Path, diagnostics: &mut Diagnostics) -> Result<NftCollection> {
    let factory_path = dir.join(FACTORY_CSV);
    let factory_file = factory_path.display().to_string();

    let factory_row: Row = reader(&factory_path)?
        .deserialize()
        .next()
        .transpose()?
        .ok_or_else(|| NftError::missing_document("factory", dir.display().to_string()))?;

    let factory = parse_factory(
        &Cells {
            file: &factory_file,
            line: 2,
            row: &factory_row,
        },
        diagnostics,
    )?;

    let tokens_path = dir.join(TOKENS_CSV);
    let mut tokens = Vec::new();

    if tokens_path.is_file() {
        let tokens_file = tokens_path.display().to_string();
        for (index, row) in reader(&tokens_path)?.deserialize::<Row>().enumerate() {
            let row = row?;
            let cells = Cells {
                file: &tokens_file,
                line: index + 2,
                row: &row,
            };
            tokens.push(parse_token(&cells, &factory, diagnostics)?);
        }
        debug!(count = tokens.len(), "Parsed token rows");
    } else {
        diagnostics.record(
            DiagnosticKind::MissingTokens,
            format!("No {} found in '{}'", TOKENS_CSV, dir.display()),
        );
    }

    NftCollection::assemble(factory, None, tokens)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const FACTORY: &str = "\
specVersion,type,name,description,product,square,hero,gallery 1,gallery 2,gallery 3,tokenUriTemplate,Att Type 1,Att Name 1,Att Desc 1,Att Type 2,Att Name 2,Att Desc 2
0.1,collectible,Tacos,Tasty tacos,product.png,square.png,,g1.png,,g3.gif,{serial_number},boolean,spicy,Is it spicy,number,level,Heat level
0.1,collectible,Ignored,,other.png,other.png,,,,,,,,,,,
";

    const TOKENS: &str = "\
serialNumber,specVersion,name,product,square,Att Name 1,Att Val 1,Att Name 2,Att Val 2
1,0.1,Taco 1,p1.png,s1.png,spicy,TRUE,level,3
default,0.1,Default Taco,p.png,s.png,spicy,false,level,0
2,0.1,Taco 2,p2.png,s2.png,,,level,hot
";

    fn fixture(factory: &str, tokens: Option<&str>) -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(FACTORY_CSV), factory).unwrap();
        if let Some(tokens) = tokens {
            std::fs::write(dir.path().join(TOKENS_CSV), tokens).unwrap();
        }
        dir
    }

    #[test]
    fn test_factory_row() {
        let dir = fixture(FACTORY, Some(TOKENS));
        let mut diagnostics = Diagnostics::new();
        let collection = parse(dir.path(), &mut diagnostics).unwrap();

        let factory = &collection.factory;
        assert_eq!(factory.metadata.name, "Tacos");
        assert_eq!(factory.metadata.asset_type, Some(AssetType::Collectible));
        assert_eq!(factory.metadata.default_locale, DEFAULT_LOCALE);
        assert_eq!(factory.token_uri_template(), TokenUriTemplate::SerialNumber);
        assert!(factory.metadata.media.hero.is_none());

        let gallery = factory.metadata.media.gallery.as_ref().unwrap();
        assert_eq!(gallery.len(), 2);
        assert_eq!(gallery[0].uris, vec!["g1.png"]);
        assert_eq!(gallery[1].content_type.as_deref(), Some("image/gif"));

        let attributes = factory.attributes.as_ref().unwrap();
        assert_eq!(attributes["spicy"].kind, AttributeType::Boolean);
        assert_eq!(attributes["level"].description.as_deref(), Some("Heat level"));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_default_token_extracted() {
        let dir = fixture(FACTORY, Some(TOKENS));
        let mut diagnostics = Diagnostics::new();
        let collection = parse(dir.path(), &mut diagnostics).unwrap();

        let default_token = collection.default_token.as_ref().unwrap();
        assert_eq!(default_token.metadata.name, "Default Taco");
        assert_eq!(collection.tokens.len(), 2);
        assert_eq!(collection.tokens[0].metadata.name, "Taco 1");
        assert_eq!(collection.tokens[1].metadata.name, "Taco 2");
    }

    #[test]
    fn test_token_attributes_coerced() {
        let dir = fixture(FACTORY, Some(TOKENS));
        let mut diagnostics = Diagnostics::new();
        let collection = parse(dir.path(), &mut diagnostics).unwrap();

        let first = collection.tokens[0].attributes.as_ref().unwrap();
        assert_eq!(first["spicy"], AttributeValue::Bool(true));
        assert_eq!(first["level"], AttributeValue::Number(3.into()));

        let second = collection.tokens[1].attributes.as_ref().unwrap();
        assert!(!second.contains_key("spicy"));
        assert_eq!(second["level"], AttributeValue::Text("hot".to_string()));
    }

    #[test]
    fn test_last_attribute_slots_use_own_columns() {
        let factory = "\
specVersion,name,product,square,Att Type 11,Att Name 11,Att Desc 11,Att Type 12,Att Name 12,Att Desc 12
0.1,Tacos,p.png,s.png,string,origin,Where from,boolean,vegan,Plant based
";
        let dir = fixture(factory, Some("serialNumber,specVersion,name,product,square\n"));
        let mut diagnostics = Diagnostics::new();
        let collection = parse(dir.path(), &mut diagnostics).unwrap();

        let attributes = collection.factory.attributes.as_ref().unwrap();
        assert_eq!(attributes.len(), 2);
        assert_eq!(attributes["origin"].description.as_deref(), Some("Where from"));
        assert_eq!(attributes["vegan"].kind, AttributeType::Boolean);
    }

    #[test]
    fn test_missing_tokens_file() {
        let dir = fixture(FACTORY, None);
        let mut diagnostics = Diagnostics::new();
        let collection = parse(dir.path(), &mut diagnostics).unwrap();

        assert!(collection.tokens.is_empty());
        assert!(collection.default_token.is_none());
        assert_eq!(diagnostics.count(DiagnosticKind::MissingTokens), 1);
    }

    #[test]
    fn test_empty_factory_is_fatal() {
        let dir = fixture("specVersion,name,product,square\n", None);
        let mut diagnostics = Diagnostics::new();

        let result = parse(dir.path(), &mut diagnostics);
        assert!(matches!(result, Err(NftError::MissingDocument { .. })));
    }

    #[test]
    fn test_missing_required_column() {
        let dir = fixture("specVersion,name,square\n0.1,Tacos,s.png\n", None);
        let mut diagnostics = Diagnostics::new();

        let err = parse(dir.path(), &mut diagnostics).unwrap_err();
        assert!(err.to_string().contains("product"));
    }

    #[test]
    fn test_unknown_extension_leaves_content_type_empty() {
        let dir = fixture("specVersion,name,product,square\n0.1,Tacos,p.tiff,s.png\n", None);
        let mut diagnostics = Diagnostics::new();
        let collection = parse(dir.path(), &mut diagnostics).unwrap();

        assert_eq!(collection.factory.metadata.media.product.content_type, None);
        assert_eq!(diagnostics.count(DiagnosticKind::UnsupportedFileType), 1);
    }

    #[test]
    fn test_duplicate_serials_rejected() {
        let tokens = "\
serialNumber,specVersion,name,product,square
1,0.1,Taco,p.png,s.png
1,0.1,Taco again,p.png,s.png
";
        let dir = fixture(FACTORY, Some(tokens));
        let mut diagnostics = Diagnostics::new();

        let result = parse(dir.path(), &mut diagnostics);
        assert!(matches!(result, Err(NftError::DuplicateSerial(s)) if s == "1"));
    }
}
