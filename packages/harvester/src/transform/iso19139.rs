//! ISO 19139 geographic metadata (`gmd:MD_Metadata`).
//!
//! ISO records nest every value in `gco:CharacterString`-style wrappers and
//! code-list elements. Lookups here go by local tag name and take the text
//! of the wrapping element, which includes the wrapped value.

use crate::document::{
    BoundingBox, CanonicalDocument, Contributor, DateType, Description, DocumentDate, GeoLocation,
    Identifier, Person, ResourceType, ResourceTypeGeneral, Rights, Subject, Title, WebLink,
    WebLinkType,
};
use crate::error::Result;
use crate::record::RawRecord;
use crate::transform::common::{
    add_web_links, derive_publication_year, infer_identifier_type, parse_coordinate,
    parse_date_value, year_of,
};
use crate::transform::{FieldMapper, TransformContext};
use crate::xml::Element;

/// Responsible-party roles that make a party a creator.
const CREATOR_ROLES: [&str; 3] = ["author", "originator", "principalInvestigator"];

/// Role of the party that becomes the publisher.
const PUBLISHER_ROLE: &str = "publisher";

/// Name of the research data link when the record has no title.
const RESEARCH_DATA_LINK_NAME: &str = "Research Data";

/// Subject scheme of ISO topic categories.
const TOPIC_CATEGORY_SCHEME: &str = "ISO 19115 Topic Category";

#[derive(Debug, Default, Clone, Copy)]
pub struct Iso19139Mapper;

/// `codeListValue` of the first code element below `element`, else its text.
fn code_value(element: &Element, code_tag: &str) -> Option<String> {
    element
        .descendant(code_tag)
        .and_then(|code| {
            code.attribute_value("codeListValue")
                .or_else(|| code.non_empty_text())
        })
        .or_else(|| element.non_empty_text())
}

fn map_date_type(code: Option<&str>) -> DateType {
    match code {
        Some("publication") => DateType::Issued,
        Some("creation") => DateType::Created,
        Some("revision") => DateType::Updated,
        _ => DateType::Other,
    }
}

fn map_scope(code: &str) -> ResourceTypeGeneral {
    match code {
        "dataset" => ResourceTypeGeneral::Dataset,
        "series" => ResourceTypeGeneral::Collection,
        "service" => ResourceTypeGeneral::Service,
        "software" => ResourceTypeGeneral::Software,
        "model" => ResourceTypeGeneral::Model,
        _ => ResourceTypeGeneral::Other,
    }
}

impl Iso19139Mapper {
    fn map_citation(citation: &Element, doc: &mut CanonicalDocument) {
        doc.titles = citation
            .child_text("title")
            .map(Title::new)
            .into_iter()
            .chain(citation.children_texts("alternateTitle").into_iter().map(|t| Title {
                title_type: Some("AlternativeTitle".to_string()),
                ..Title::new(t)
            }))
            .collect();

        doc.dates = citation
            .children_named("date")
            .filter_map(|d| d.child("CI_Date"))
            .filter_map(|ci| {
                let value = ci.child_text("date")?;
                let code = ci
                    .descendant("CI_DateTypeCode")
                    .and_then(|c| c.attribute_value("codeListValue"));
                Some(DocumentDate {
                    date: parse_date_value(&value),
                    date_type: map_date_type(code.as_deref()),
                    information: None,
                })
            })
            .collect();

        doc.resource_identifier = citation
            .descendant("MD_Identifier")
            .or_else(|| citation.descendant("RS_Identifier"))
            .and_then(|i| i.child_text("code"))
            .map(|code| {
                let kind = infer_identifier_type(&code).map(str::to_string);
                Identifier::new(code, kind)
            });

        for party in citation.descendants("CI_ResponsibleParty") {
            let Some(name) = party
                .child_text("individualName")
                .or_else(|| party.child_text("organisationName"))
            else {
                continue;
            };
            let role = party
                .descendant("CI_RoleCode")
                .and_then(|r| r.attribute_value("codeListValue"));

            let mut person = Person::new(name);
            if party.child_text("individualName").is_some() {
                person.affiliations = party.child_text("organisationName").into_iter().collect();
            }

            match role.as_deref() {
                None => doc.creators.push(person),
                Some(r) if CREATOR_ROLES.contains(&r) => doc.creators.push(person),
                Some(PUBLISHER_ROLE) if doc.publisher.is_none() => {
                    doc.publisher = Some(person.name);
                }
                Some(r) => doc.contributors.push(Contributor {
                    contributor_type: r.to_string(),
                    person,
                }),
            }
        }
    }

    fn map_identification(identification: &Element, doc: &mut CanonicalDocument) {
        if let Some(citation) = identification.descendant("CI_Citation") {
            Self::map_citation(citation, doc);
        }

        doc.descriptions = identification
            .child_text("abstract")
            .map(|a| Description {
                description_type: Some("Abstract".to_string()),
                ..Description::new(a)
            })
            .into_iter()
            .collect();

        doc.subjects.extend(
            identification
                .descendants("keyword")
                .into_iter()
                .filter_map(Element::non_empty_text)
                .map(Subject::new),
        );
        doc.subjects.extend(
            identification
                .children_texts("topicCategory")
                .into_iter()
                .map(|t| Subject {
                    scheme: Some(TOPIC_CATEGORY_SCHEME.to_string()),
                    ..Subject::new(t)
                }),
        );

        doc.rights = identification
            .descendants("resourceConstraints")
            .into_iter()
            .flat_map(|c| {
                c.descendants("useLimitation")
                    .into_iter()
                    .chain(c.descendants("otherConstraints"))
                    .filter_map(Element::non_empty_text)
            })
            .map(|value| Rights {
                value: Some(value),
                ..Rights::default()
            })
            .collect();

        doc.geo_locations = identification
            .descendants("EX_Extent")
            .into_iter()
            .map(|extent| GeoLocation {
                place: extent.child_text("description"),
                bounding_box: extent
                    .descendant("EX_GeographicBoundingBox")
                    .and_then(Self::parse_box),
                ..GeoLocation::default()
            })
            .filter(|g| !g.is_empty())
            .collect();
    }

    #[must_use]
    pub fn parse_box(element: &Element) -> Option<BoundingBox> {
        let bound = |tag: &str| element.child_text(tag).as_deref().and_then(parse_coordinate);
        Some(BoundingBox {
            west: bound("westBoundLongitude")?,
            east: bound("eastBoundLongitude")?,
            south: bound("southBoundLatitude")?,
            north: bound("northBoundLatitude")?,
        })
    }

    /// Link built from the title and the first transfer-options URL.
    fn research_data_link(metadata: &Element, title: Option<&str>) -> Option<WebLink> {
        let url = metadata
            .descendant("transferOptions")?
            .descendant("URL")?
            .non_empty_text()?;
        Some(WebLink::new(
            title.unwrap_or(RESEARCH_DATA_LINK_NAME),
            url,
            WebLinkType::ResearchData,
        ))
    }
}

impl FieldMapper for Iso19139Mapper {
    fn name(&self) -> &'static str {
        "ISO 19139"
    }

    fn map_fields(
        &self,
        _record: &RawRecord,
        metadata: &Element,
        context: &TransformContext,
        doc: &mut CanonicalDocument,
    ) -> Result<()> {
        // MD_DataIdentification or SV_ServiceIdentification
        if let Some(identification) = metadata
            .child("identificationInfo")
            .and_then(|i| i.element_children().next())
        {
            Self::map_identification(identification, doc);
        }

        if let Some(file_identifier) = metadata.child_text("fileIdentifier") {
            let identifier = Identifier::new(file_identifier, None);
            if doc.resource_identifier.is_none() {
                doc.resource_identifier = Some(identifier);
            } else {
                doc.alternate_identifiers.push(identifier);
            }
        }

        doc.language = metadata
            .child("language")
            .and_then(|l| code_value(l, "LanguageCode"));
        doc.resource_type = metadata
            .child("hierarchyLevel")
            .and_then(|h| code_value(h, "MD_ScopeCode"))
            .map(|scope| ResourceType {
                general: map_scope(&scope),
                value: Some(scope),
            });
        doc.formats = metadata
            .descendants("MD_Format")
            .into_iter()
            .filter_map(|f| f.child_text("name"))
            .collect();

        derive_publication_year(doc);
        if doc.publication_year.is_none() {
            doc.publication_year = metadata
                .child_text("dateStamp")
                .as_deref()
                .and_then(year_of);
        }

        if let Some(link) = Self::research_data_link(metadata, doc.main_title()) {
            doc.web_links.push(link);
        }
        add_web_links(doc, context);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const RECORD: &str = r##"<record>
  <header>
    <identifier>oai:example.org:iso-1</identifier>
    <datestamp>2017-01-01</datestamp>
  </header>
  <metadata>
    <gmd:MD_Metadata xmlns:gmd="http://www.isotc211.org/2005/gmd"
                     xmlns:gco="http://www.isotc211.org/2005/gco">
      <gmd:fileIdentifier><gco:CharacterString>iso-file-1</gco:CharacterString></gmd:fileIdentifier>
      <gmd:language><gmd:LanguageCode codeList="http://www.loc.gov/standards/iso639-2/" codeListValue="eng">English</gmd:LanguageCode></gmd:language>
      <gmd:hierarchyLevel><gmd:MD_ScopeCode codeList="#MD_ScopeCode" codeListValue="dataset"/></gmd:hierarchyLevel>
      <gmd:dateStamp><gco:DateTime>2014-06-30T10:00:00</gco:DateTime></gmd:dateStamp>
      <gmd:identificationInfo>
        <gmd:MD_DataIdentification>
          <gmd:citation>
            <gmd:CI_Citation>
              <gmd:title><gco:CharacterString>Soil moisture grid</gco:CharacterString></gmd:title>
              <gmd:date>
                <gmd:CI_Date>
                  <gmd:date><gco:Date>2013-02-01</gco:Date></gmd:date>
                  <gmd:dateType><gmd:CI_DateTypeCode codeListValue="creation"/></gmd:dateType>
                </gmd:CI_Date>
              </gmd:date>
              <gmd:date>
                <gmd:CI_Date>
                  <gmd:date><gco:Date>2013-09-01</gco:Date></gmd:date>
                  <gmd:dateType><gmd:CI_DateTypeCode codeListValue="revision"/></gmd:dateType>
                </gmd:CI_Date>
              </gmd:date>
              <gmd:citedResponsibleParty>
                <gmd:CI_ResponsibleParty>
                  <gmd:individualName><gco:CharacterString>Doe, Jane</gco:CharacterString></gmd:individualName>
                  <gmd:organisationName><gco:CharacterString>Soil Lab</gco:CharacterString></gmd:organisationName>
                  <gmd:role><gmd:CI_RoleCode codeListValue="author"/></gmd:role>
                </gmd:CI_ResponsibleParty>
              </gmd:citedResponsibleParty>
              <gmd:citedResponsibleParty>
                <gmd:CI_ResponsibleParty>
                  <gmd:organisationName><gco:CharacterString>Data Center</gco:CharacterString></gmd:organisationName>
                  <gmd:role><gmd:CI_RoleCode codeListValue="publisher"/></gmd:role>
                </gmd:CI_ResponsibleParty>
              </gmd:citedResponsibleParty>
              <gmd:citedResponsibleParty>
                <gmd:CI_ResponsibleParty>
                  <gmd:individualName><gco:CharacterString>Roe, Richard</gco:CharacterString></gmd:individualName>
                  <gmd:role><gmd:CI_RoleCode codeListValue="pointOfContact"/></gmd:role>
                </gmd:CI_ResponsibleParty>
              </gmd:citedResponsibleParty>
            </gmd:CI_Citation>
          </gmd:citation>
          <gmd:abstract><gco:CharacterString>Gridded soil moisture.</gco:CharacterString></gmd:abstract>
          <gmd:descriptiveKeywords>
            <gmd:MD_Keywords>
              <gmd:keyword><gco:CharacterString>soil</gco:CharacterString></gmd:keyword>
              <gmd:keyword><gco:CharacterString>moisture</gco:CharacterString></gmd:keyword>
            </gmd:MD_Keywords>
          </gmd:descriptiveKeywords>
          <gmd:resourceConstraints>
            <gmd:MD_LegalConstraints>
              <gmd:useLimitation><gco:CharacterString>CC BY 4.0</gco:CharacterString></gmd:useLimitation>
            </gmd:MD_LegalConstraints>
          </gmd:resourceConstraints>
          <gmd:topicCategory><gmd:MD_TopicCategoryCode>geoscientificInformation</gmd:MD_TopicCategoryCode></gmd:topicCategory>
          <gmd:extent>
            <gmd:EX_Extent>
              <gmd:description><gco:CharacterString>Bavaria</gco:CharacterString></gmd:description>
              <gmd:geographicElement>
                <gmd:EX_GeographicBoundingBox>
                  <gmd:westBoundLongitude><gco:Decimal>8.9</gco:Decimal></gmd:westBoundLongitude>
                  <gmd:eastBoundLongitude><gco:Decimal>13.8</gco:Decimal></gmd:eastBoundLongitude>
                  <gmd:southBoundLatitude><gco:Decimal>47.2</gco:Decimal></gmd:southBoundLatitude>
                  <gmd:northBoundLatitude><gco:Decimal>50.5</gco:Decimal></gmd:northBoundLatitude>
                </gmd:EX_GeographicBoundingBox>
              </gmd:geographicElement>
            </gmd:EX_Extent>
          </gmd:extent>
        </gmd:MD_DataIdentification>
      </gmd:identificationInfo>
      <gmd:distributionInfo>
        <gmd:MD_Distribution>
          <gmd:distributionFormat>
            <gmd:MD_Format><gmd:name><gco:CharacterString>NetCDF</gco:CharacterString></gmd:name></gmd:MD_Format>
          </gmd:distributionFormat>
          <gmd:transferOptions>
            <gmd:MD_DigitalTransferOptions>
              <gmd:onLine>
                <gmd:CI_OnlineResource>
                  <gmd:linkage><gmd:URL>https://data.example.org/soil.nc</gmd:URL></gmd:linkage>
                </gmd:CI_OnlineResource>
              </gmd:onLine>
            </gmd:MD_DigitalTransferOptions>
          </gmd:transferOptions>
        </gmd:MD_Distribution>
      </gmd:distributionInfo>
    </gmd:MD_Metadata>
  </metadata>
</record>"##;

    fn transform() -> CanonicalDocument {
        let record = RawRecord::parse(RECORD).unwrap();
        let mut doc = CanonicalDocument::new(record.identifier(), "Repo");
        Iso19139Mapper
            .map_fields(
                &record,
                record.metadata.as_ref().unwrap(),
                &TransformContext::new("Repo"),
                &mut doc,
            )
            .unwrap();
        doc
    }

    #[test]
    fn test_citation_fields() {
        let doc = transform();

        assert_eq!(doc.main_title(), Some("Soil moisture grid"));
        assert_eq!(doc.creators.len(), 1);
        assert_eq!(doc.creators[0].name, "Doe, Jane");
        assert_eq!(doc.creators[0].affiliations, vec!["Soil Lab"]);
        assert_eq!(doc.publisher.as_deref(), Some("Data Center"));
        assert_eq!(doc.contributors[0].contributor_type, "pointOfContact");
        assert_eq!(
            doc.dates,
            vec![
                DocumentDate::point("2013-02-01", DateType::Created),
                DocumentDate::point("2013-09-01", DateType::Updated),
            ]
        );
    }

    #[test]
    fn test_year_falls_back_to_date_stamp() {
        // No publication date in the citation.
        assert_eq!(transform().publication_year, Some(2014));
    }

    #[test]
    fn test_identification_fields() {
        let doc = transform();

        assert_eq!(doc.descriptions[0].value, "Gridded soil moisture.");
        let subjects: Vec<&str> = doc.subjects.iter().map(|s| s.value.as_str()).collect();
        assert_eq!(subjects, vec!["soil", "moisture", "geoscientificInformation"]);
        assert_eq!(doc.rights[0].value.as_deref(), Some("CC BY 4.0"));
        assert_eq!(doc.geo_locations[0].place.as_deref(), Some("Bavaria"));
        assert_eq!(
            doc.geo_locations[0].bounding_box,
            Some(BoundingBox {
                west: 8.9,
                east: 13.8,
                south: 47.2,
                north: 50.5
            })
        );
    }

    #[test]
    fn test_root_fields() {
        let doc = transform();

        assert_eq!(doc.language.as_deref(), Some("eng"));
        assert_eq!(
            doc.resource_type,
            Some(ResourceType {
                general: ResourceTypeGeneral::Dataset,
                value: Some("dataset".to_string())
            })
        );
        assert_eq!(doc.formats, vec!["NetCDF"]);
        assert_eq!(
            doc.resource_identifier,
            Some(Identifier::new("iso-file-1", None))
        );
    }

    #[test]
    fn test_research_data_link() {
        let doc = transform();

        assert_eq!(
            doc.web_links,
            vec![WebLink::new(
                "Soil moisture grid",
                "https://data.example.org/soil.nc",
                WebLinkType::ResearchData
            )]
        );
    }
}
