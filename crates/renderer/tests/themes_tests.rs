//! Tests for thematic passes over an in-memory feature source.

use map_common::{ClassCodes, Color, ColorPair, Feature, MapError, MapResult};
use renderer::catalog::{CategoryCatalog, CodeRange, DEFAULT_STYLE};
use renderer::projection::Projector;
use renderer::source::{FeatureQuery, FeatureSource, MemoryFeatureSource};
use renderer::themes::{run_themes, LabelKind, LabelRule, ThemeSpec};
use test_utils::{bbox, bbox_from, codes, ids, line_feature, point_feature, square_feature};

const CATALOG: &str = r##"
categories:
  OPENAREA:
    range: [30000000, 39999999]
  STRASSEN_WEGE:
    range: [35000000, 35999999]
    style: ["#5a5a5a", "#5a5a5a"]
  AUTOBAHN:
    range: [35100000, 35109999]
    style: ["#ffaa00", "#cc8800"]
  LANDSTRASSE:
    range: [35110000, 35119999]
  PARK:
    range: [31000000, 31099999]
    style: [[34, 139, 34], [20, 100, 20]]
  GARTEN:
    range: [31100000, 31199999]
    style: [[200, 200, 200, 180], [150, 150, 150, 200]]
  BAHNSTEIG:
    range: [33000000, 33099999]
  HISTORIC:
    range: [93300000, 93399999]
icons:
  - icon: park
    label: true
    codes: [[31000100, 31000100]]
"##;

const OPEN_AREA: &str = r##"
name: openarea
category: OPENAREA
style: [[237, 222, 107], [200, 190, 73]]
streets:
  category: STRASSEN_WEGE
  classes: [AUTOBAHN, LANDSTRASSE]
  style_category: STRASSEN_WEGE
  inflate: 0.000026
  remainder_inflate: 0.00003
rules:
  - categories: [PARK, GARTEN]
    inflate: 0.00002
discard: [BAHNSTEIG]
remainder:
  skip_tags: [tunnel]
  tag_inflate:
    - tag: stream
      inflate: 0.5
labels:
  - primary: [31000000, 31099999]
"##;

fn catalog() -> CategoryCatalog {
    CategoryCatalog::from_yaml(CATALOG).unwrap()
}

fn theme() -> ThemeSpec {
    serde_yaml::from_str(OPEN_AREA).unwrap()
}

fn projector() -> Projector {
    Projector::new(bbox_from(bbox::HUNDRED), 100, 100).unwrap()
}

fn pool() -> Vec<Feature> {
    let mut park = square_feature(1, codes(31000100), 20.0, 20.0, 5.0);
    park.name = "Stadtpark".to_string();
    vec![
        park,
        square_feature(2, codes(31100001), 60.0, 20.0, 5.0),
        line_feature(3, "A9", codes(35100001), &[(0.0, 50.0), (100.0, 50.0)]),
        line_feature(4, "Landstrasse", codes(35110001), &[(0.0, 60.0), (50.0, 60.0), (100.0, 60.0)]),
        line_feature(5, "Feldweg", codes(35900001), &[(0.0, 70.0), (100.0, 70.0)]),
        square_feature(6, codes(33000001), 80.0, 80.0, 2.0),
        square_feature(7, codes(39000001), 40.0, 80.0, 3.0).with_tags("tunnel=yes"),
        square_feature(8, codes(39000002), 45.0, 85.0, 3.0).with_tags("waterway=stream"),
        square_feature(9, codes(39000003), 50.0, 90.0, 3.0),
        // Outside the target.
        square_feature(10, codes(31000100), 500.0, 500.0, 3.0),
    ]
}

/// A source whose backend is always down.
struct FailingSource;

impl FeatureSource for FailingSource {
    fn features(&self, _query: &FeatureQuery) -> MapResult<Vec<Feature>> {
        Err(MapError::FeatureSource("connection refused".to_string()))
    }
}

fn styled(output: &renderer::themes::ThemeOutput) -> Vec<(i64, ColorPair, f64)> {
    output
        .drawables
        .iter()
        .map(|d| (d.feature.id, d.style, d.inflate))
        .collect()
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_theme_parses_from_yaml() {
    let theme = theme();
    assert_eq!(theme.rules.len(), 1);
    assert_eq!(theme.discard, vec!["BAHNSTEIG"]);
    assert_eq!(theme.remainder.tag_inflate[0].inflate, 0.5);
    assert_eq!(theme.labels[0].primary, Some(CodeRange::new(31000000, 31099999)));
    theme.validate(&catalog()).unwrap();
}

#[test]
fn test_catalog_accepts_every_color_spelling() {
    let c = catalog();
    assert_eq!(c.style("STRASSEN_WEGE").fill, Color::rgb(90, 90, 90));
    assert_eq!(c.style("PARK").stroke, Color::rgb(20, 100, 20));
    assert_eq!(c.style("LANDSTRASSE"), DEFAULT_STYLE);
    assert_eq!(c.icon_for(31000100).unwrap().icon, "park");
}

#[test]
fn test_validate_names_missing_category() {
    let mut theme = theme();
    theme.discard.push("NIRGENDWO".to_string());
    let err = theme.validate(&catalog()).unwrap_err();
    assert!(matches!(err, MapError::UnknownCategory(ref n) if n == "NIRGENDWO"));
}

// ============================================================================
// Pass output
// ============================================================================

#[test]
fn test_open_area_pass() {
    let catalog = catalog();
    let source = MemoryFeatureSource::new(pool());
    let out = theme().run(&catalog, &source, &projector()).unwrap();
    let drawn = styled(&out);

    let by_id = |id: i64| drawn.iter().find(|d| d.0 == id).copied();
    let theme_style = ColorPair::new(Color::rgb(237, 222, 107), Color::rgb(200, 190, 73));
    let street_style = catalog.style("STRASSEN_WEGE");

    // Streets: styled class, unstyled class falls back, remainder.
    assert_eq!(by_id(3), Some((3, catalog.style("AUTOBAHN"), 0.000026)));
    assert_eq!(by_id(4), Some((4, street_style, 0.000026)));
    assert_eq!(by_id(5), Some((5, street_style, 0.00003)));

    // Rule group: own style, and a default-colored category takes the
    // theme style.
    assert_eq!(by_id(1), Some((1, catalog.style("PARK"), 0.00002)));
    assert_eq!(by_id(2), Some((2, theme_style, 0.00002)));

    // Discarded, skipped by tag, outside the target.
    assert!(by_id(6).is_none());
    assert!(by_id(7).is_none());
    assert!(by_id(10).is_none());

    // Remainder with and without a tag override.
    assert_eq!(by_id(8), Some((8, theme_style, 0.5)));
    assert_eq!(by_id(9), Some((9, theme_style, 0.0)));
}

#[test]
fn test_street_labels_in_class_order() {
    let source = MemoryFeatureSource::new(pool());
    let out = theme().run(&catalog(), &source, &projector()).unwrap();

    let names: Vec<&str> = out.streets.iter().map(|s| s.name.as_str()).collect();
    // Feldweg is outside every class and gets no label.
    assert_eq!(names, vec!["A9", "Landstrasse"]);
    // y = 100 - 60
    assert!(out.streets[1].points.iter().all(|p| p.1 == 40.0));
}

#[test]
fn test_name_labels_at_centroid() {
    let source = MemoryFeatureSource::new(pool());
    let out = theme().run(&catalog(), &source, &projector()).unwrap();

    assert_eq!(out.labels.len(), 1);
    let label = &out.labels[0];
    assert_eq!(label.text, "Stadtpark");
    assert_eq!((label.x, label.y), (20, 80));
    assert!(out.water_labels.is_empty());
}

#[test]
fn test_only_drawn_features_get_labels() {
    let theme = ThemeSpec {
        labels: vec![LabelRule {
            kind: LabelKind::Water,
            primary: Some(CodeRange::new(33000000, 39999999)),
            ..LabelRule::default()
        }],
        ..theme()
    };
    let mut features = pool();
    features[5].name = "Gleis 1".to_string();
    features[6].name = "Tunnelbach".to_string();
    features[8].name = "Dorfbach".to_string();
    let source = MemoryFeatureSource::new(features);

    let out = theme.run(&catalog(), &source, &projector()).unwrap();
    // Gleis 1 is discarded and Tunnelbach skipped by tag.
    let names: Vec<&str> = out.water_labels.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(names, vec!["Dorfbach"]);
    assert!(out.labels.is_empty());
}

#[test]
fn test_underscore_streets_not_labelled() {
    let source = MemoryFeatureSource::new(vec![line_feature(
        1,
        "ZUFAHRT_4564485",
        codes(35100001),
        &[(0.0, 50.0), (100.0, 50.0)],
    )]);
    let out = theme().run(&catalog(), &source, &projector()).unwrap();
    assert_eq!(out.drawables.len(), 1);
    assert!(out.streets.is_empty());
}

#[test]
fn test_historic_features_excluded() {
    let theme = ThemeSpec {
        exclude_historic: true,
        ..ThemeSpec::new("parks", "PARK")
    };
    let source = MemoryFeatureSource::new(vec![
        point_feature(1, "", ClassCodes::new(31000001, 93300001, 0), 50.0, 50.0),
        point_feature(2, "", ClassCodes::new(31000001, 0, 0), 50.0, 50.0),
    ]);
    let out = theme.run(&catalog(), &source, &projector()).unwrap();
    let drawn: Vec<i64> = out.drawables.iter().map(|d| d.feature.id).collect();
    assert_eq!(drawn, vec![2]);
}

#[test]
fn test_geometry_type_filter_is_case_insensitive() {
    let theme = ThemeSpec {
        geometry_type: Some("linestring".to_string()),
        ..ThemeSpec::new("lines", "OPENAREA")
    };
    let source = MemoryFeatureSource::new(pool());
    let out = theme.run(&catalog(), &source, &projector()).unwrap();
    let mut drawn: Vec<i64> = out.drawables.iter().map(|d| d.feature.id).collect();
    drawn.sort_unstable();
    assert_eq!(drawn, vec![3, 4, 5]);
}

// ============================================================================
// Multiple themes
// ============================================================================

#[test]
fn test_themes_append_in_order() {
    let parks = ThemeSpec::new("parks", "PARK");
    let streets = ThemeSpec::new("streets", "STRASSEN_WEGE");
    let source = MemoryFeatureSource::new(pool());

    let out = run_themes(&[parks, streets], &catalog(), &source, &projector()).unwrap();
    let drawn: Vec<i64> = out.drawables.iter().map(|d| d.feature.id).collect();
    assert_eq!(&drawn[..1], &[1]);
    let mut rest = drawn[1..].to_vec();
    rest.sort_unstable();
    assert_eq!(rest, vec![3, 4, 5]);
}

#[test]
fn test_failing_theme_skipped_others_kept() {
    let themes = [
        ThemeSpec::new("parks", "PARK"),
        ThemeSpec::new("broken", "NIRGENDWO"),
        ThemeSpec::new("streets", "STRASSEN_WEGE"),
    ];
    let source = MemoryFeatureSource::new(pool());

    let out = run_themes(&themes, &catalog(), &source, &projector()).unwrap();
    let drawn: Vec<i64> = out.drawables.iter().map(|d| d.feature.id).collect();
    assert_eq!(&drawn[..1], &[1]);
    let mut rest = drawn[1..].to_vec();
    rest.sort_unstable();
    assert_eq!(rest, vec![3, 4, 5]);
    assert_eq!(out.skipped, vec!["broken"]);
}

#[test]
fn test_source_error_aborts_all() {
    let themes = [ThemeSpec::new("parks", "PARK"), ThemeSpec::new("streets", "STRASSEN_WEGE")];
    let result = run_themes(&themes, &catalog(), &FailingSource, &projector());
    assert!(matches!(result, Err(MapError::FeatureSource(_))));
}

#[test]
fn test_features_from_json() {
    let json = r#"[
        {"id": 1, "name": "Wiese", "codes": {"primary": 31000001},
         "geometry": {"type": "Point", "coordinates": [50.0, 50.0]}},
        {"id": 2, "codes": {"primary": 31000001, "secondary": 93300001},
         "geometry": {"type": "Point", "coordinates": [60.0, 50.0]}}
    ]"#;
    let source = MemoryFeatureSource::from_json(json).unwrap();
    assert_eq!(source.len(), 2);

    let out = ThemeSpec::new("parks", "PARK")
        .run(&catalog(), &source, &projector())
        .unwrap();
    let drawn: Vec<Feature> = out.drawables.iter().map(|d| d.feature.clone()).collect();
    assert_eq!(ids(&drawn), vec![1, 2]);
    assert_eq!(drawn[0].geometry_type, "POINT");
}
