//! Thematic passes.
//!
//! A theme fetches one top-level category, splits it into prioritized
//! sub-categories and appends styled drawables to the display list. Each
//! theme is plain data ([`ThemeSpec`]) so the layer order and constants can
//! be changed from configuration.

use map_common::{ColorPair, Coord, ErrorKind, Feature, Geometry, MapResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::catalog::{CategoryCatalog, CodeRange};
use crate::classify::{extract_category, partition_categories};
use crate::compositor::DisplayList;
use crate::placement::{LabelRequest, StreetLabel};
use crate::projection::Projector;
use crate::source::{FeatureQuery, FeatureSource};

/// Category consulted when a theme excludes historic features.
pub const HISTORIC_CATEGORY: &str = "HISTORIC";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeSpec {
    pub name: String,

    /// Top-level category fetched from the source.
    pub category: String,

    #[serde(default)]
    pub geometry_type: Option<String>,

    /// Skip features whose secondary code is historic.
    #[serde(default)]
    pub exclude_historic: bool,

    /// Style for rules without their own and for the remainder. Defaults to
    /// the catalog style of `category`.
    #[serde(default)]
    pub style: Option<ColorPair>,

    /// Streets are extracted before any other rule.
    #[serde(default)]
    pub streets: Option<StreetSpec>,

    /// Rule groups in priority order.
    #[serde(default)]
    pub rules: Vec<RuleGroup>,

    /// Categories removed from the pool without drawing.
    #[serde(default)]
    pub discard: Vec<String>,

    #[serde(default)]
    pub remainder: RemainderPolicy,

    #[serde(default)]
    pub labels: Vec<LabelRule>,
}

/// Consecutive categories sharing one buffer and fallback style.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleGroup {
    pub categories: Vec<String>,

    #[serde(default)]
    pub inflate: f64,

    /// Used for categories the catalog has no style for. Defaults to the
    /// theme style.
    #[serde(default)]
    pub style: Option<ColorPair>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreetSpec {
    /// Category holding every street.
    pub category: String,

    /// Street classes in label priority order.
    pub classes: Vec<String>,

    /// Category whose style stands in for unstyled classes and is used for
    /// the remaining streets.
    pub style_category: String,

    pub inflate: f64,

    /// Buffer of streets outside every class.
    pub remainder_inflate: f64,
}

/// What happens to features no rule claimed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RemainderPolicy {
    pub inflate: f64,
    /// Features with any of these tags are not drawn.
    pub skip_tags: Vec<String>,
    /// First matching tag overrides `inflate`.
    pub tag_inflate: Vec<TagInflate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagInflate {
    pub tag: String,
    pub inflate: f64,
}

impl RemainderPolicy {
    /// Buffer for a remaining feature, or None if it is not drawn.
    pub fn inflate_for(&self, feature: &Feature) -> Option<f64> {
        if self.skip_tags.iter().any(|t| feature.has_tag(t)) {
            return None;
        }
        let inflate = self
            .tag_inflate
            .iter()
            .find(|t| feature.has_tag(&t.tag))
            .map_or(self.inflate, |t| t.inflate);
        Some(inflate)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelKind {
    #[default]
    Neutral,
    Water,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelAnchor {
    #[default]
    Centroid,
    InteriorPoint,
}

/// Which features of a theme get a free-standing name label.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelRule {
    pub kind: LabelKind,
    pub anchor: LabelAnchor,
    /// Restrict to primary codes in this range.
    pub primary: Option<CodeRange>,
    pub require_tag: Option<String>,
    /// Names that are never shown.
    pub exclude_names: Vec<String>,
    /// Names containing any of these are never shown.
    pub exclude_substrings: Vec<String>,
}

impl LabelRule {
    pub fn accepts(&self, feature: &Feature) -> bool {
        let name = feature.name.as_str();
        !name.is_empty()
            && self.primary.map_or(true, |r| r.contains(feature.codes.primary))
            && self
                .require_tag
                .as_deref()
                .map_or(true, |t| feature.tags.contains(t))
            && !self.exclude_names.iter().any(|n| n == name)
            && !self.exclude_substrings.iter().any(|s| name.contains(s.as_str()))
    }

    fn anchor_of(&self, geometry: &Geometry) -> Option<Coord> {
        match self.anchor {
            LabelAnchor::Centroid => geometry.centroid(),
            LabelAnchor::InteriorPoint => geometry.interior_point(),
        }
    }
}

/// Everything one theme contributes to a render.
#[derive(Debug, Default)]
pub struct ThemeOutput {
    pub drawables: DisplayList,
    pub labels: Vec<LabelRequest>,
    pub water_labels: Vec<LabelRequest>,
    pub streets: Vec<StreetLabel>,
    /// Names of themes skipped for configuration errors.
    pub skipped: Vec<String>,
}

impl ThemeOutput {
    /// Append another theme's output after this one.
    pub fn append(&mut self, other: ThemeOutput) {
        self.drawables.append(other.drawables);
        self.labels.extend(other.labels);
        self.water_labels.extend(other.water_labels);
        self.streets.extend(other.streets);
        self.skipped.extend(other.skipped);
    }
}

impl ThemeSpec {
    /// A theme that draws its whole category with one style.
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            geometry_type: None,
            exclude_historic: false,
            style: None,
            streets: None,
            rules: Vec::new(),
            discard: Vec::new(),
            remainder: RemainderPolicy::default(),
            labels: Vec::new(),
        }
    }

    /// Every category this theme refers to.
    pub fn referenced_categories(&self) -> Vec<&str> {
        let mut names = vec![self.category.as_str()];
        if self.exclude_historic {
            names.push(HISTORIC_CATEGORY);
        }
        if let Some(streets) = &self.streets {
            names.push(&streets.category);
            names.extend(streets.classes.iter().map(String::as_str));
        }
        for group in &self.rules {
            names.extend(group.categories.iter().map(String::as_str));
        }
        names.extend(self.discard.iter().map(String::as_str));
        names
    }

    /// Fail on the first category the catalog does not know.
    pub fn validate(&self, catalog: &CategoryCatalog) -> MapResult<()> {
        for name in self.referenced_categories() {
            catalog.range(name)?;
        }
        Ok(())
    }

    /// Run the pass. Categories are checked before anything is fetched, so a
    /// failing theme contributes nothing.
    pub fn run(
        &self,
        catalog: &CategoryCatalog,
        source: &dyn FeatureSource,
        projector: &Projector,
    ) -> MapResult<ThemeOutput> {
        self.validate(catalog)?;

        let mut query = FeatureQuery::new(*projector.bbox(), catalog.range(&self.category)?);
        if let Some(geometry_type) = &self.geometry_type {
            query = query.with_geometry_type(geometry_type.clone());
        }
        if self.exclude_historic {
            query = query.excluding_secondary(catalog.range(HISTORIC_CATEGORY)?);
        }
        let mut pool = source.features(&query)?;
        let fetched = pool.len();

        let mut out = ThemeOutput::default();

        let theme_style = self.style.unwrap_or_else(|| catalog.style(&self.category));

        if let Some(streets) = &self.streets {
            pool = self.run_streets(streets, pool, catalog, projector, &mut out)?;
        }

        for group in &self.rules {
            let fallback = group.style.unwrap_or(theme_style);
            let (buckets, rest) = partition_categories(pool, catalog, &group.categories)?;
            for (name, bucket) in group.categories.iter().zip(buckets) {
                let style = catalog.style_or(name, fallback);
                out.drawables.extend_styled(bucket, style, group.inflate);
            }
            pool = rest;
        }

        for name in &self.discard {
            let (_, rest) = extract_category(pool, catalog, name)?;
            pool = rest;
        }

        for feature in pool {
            if let Some(inflate) = self.remainder.inflate_for(&feature) {
                out.drawables.push(feature, theme_style, inflate);
            }
        }

        let (labels, water_labels) = self.collect_labels(&out.drawables, projector);
        out.labels = labels;
        out.water_labels = water_labels;

        debug!(
            theme = %self.name,
            fetched,
            drawables = out.drawables.len(),
            labels = out.labels.len() + out.water_labels.len(),
            streets = out.streets.len(),
            "Theme pass finished"
        );
        Ok(out)
    }

    /// Name labels of drawn features only, in paint-list order.
    fn collect_labels(
        &self,
        drawn: &DisplayList,
        projector: &Projector,
    ) -> (Vec<LabelRequest>, Vec<LabelRequest>) {
        let (mut labels, mut water_labels) = (Vec::new(), Vec::new());
        for rule in &self.labels {
            let accepted = drawn.iter().map(|d| &d.feature).filter(|f| rule.accepts(f));
            for feature in accepted {
                let Some(anchor) = rule.anchor_of(&feature.geometry) else {
                    continue;
                };
                let (x, y) = projector.to_pixel(&anchor);
                let request = LabelRequest {
                    x,
                    y,
                    text: feature.name.clone(),
                };
                match rule.kind {
                    LabelKind::Neutral => labels.push(request),
                    LabelKind::Water => water_labels.push(request),
                }
            }
        }
        (labels, water_labels)
    }

    /// Draw streets class by class and queue their names. Returns the pool
    /// without streets.
    fn run_streets(
        &self,
        spec: &StreetSpec,
        pool: Vec<Feature>,
        catalog: &CategoryCatalog,
        projector: &Projector,
        out: &mut ThemeOutput,
    ) -> MapResult<Vec<Feature>> {
        let (streets, rest) = extract_category(pool, catalog, &spec.category)?;
        let fallback = catalog.style(&spec.style_category);

        let (classes, others) = partition_categories(streets, catalog, &spec.classes)?;
        for (name, bucket) in spec.classes.iter().zip(classes) {
            let style = catalog.style_or(name, fallback);
            for feature in bucket {
                if let Some(label) = street_label(&feature, projector) {
                    out.streets.push(label);
                }
                out.drawables.push(feature, style, spec.inflate);
            }
        }
        out.drawables
            .extend_styled(others, fallback, spec.remainder_inflate);
        Ok(rest)
    }
}

/// Street label candidate for a named line. Synthetic names with an
/// underscore are never labelled.
fn street_label(feature: &Feature, projector: &Projector) -> Option<StreetLabel> {
    if feature.name.is_empty() || feature.name.contains('_') {
        return None;
    }
    let Geometry::LineString(line) = &feature.geometry else {
        return None;
    };
    if line.0.len() < 2 {
        return None;
    }
    let points = line
        .coords()
        .map(|c| {
            let (x, y) = projector.to_pixel(c);
            (x as f32, y as f32)
        })
        .collect();
    Some(StreetLabel {
        name: feature.name.clone(),
        points,
    })
}

/// Run every theme in order and merge their output.
///
/// A theme failing on its configuration contributes nothing and the others
/// still run. Data and render errors abort the whole render.
pub fn run_themes(
    themes: &[ThemeSpec],
    catalog: &CategoryCatalog,
    source: &dyn FeatureSource,
    projector: &Projector,
) -> MapResult<ThemeOutput> {
    let mut merged = ThemeOutput::default();
    for theme in themes {
        match theme.run(catalog, source, projector) {
            Ok(output) => merged.append(output),
            Err(e) if e.kind() == ErrorKind::Configuration => {
                error!(theme = %theme.name, error = %e, "Theme skipped");
                merged.skipped.push(theme.name.clone());
            }
            Err(e) => {
                error!(theme = %theme.name, error = %e, "Theme pass failed");
                return Err(e);
            }
        }
    }
    Ok(merged)
}

const VEGETATION_CLASSES: &[&str] = &[
    "HECKE", "BAUMREIHE", "EINZELNER_BAUM", "VEGETATION_SINGLE_OBJECT",
    "GRASFLAECHE", "FEUCHTWIESE", "SUMPF",
    "ACKERLAND", "OBST_ANBAUFLAECHE", "WEINBERG", "WEIDELAND", "AGRICULTURAL",
    "LAUBWALD", "NADELWALD", "MISCHWALD", "BUSCHWERK", "WALD",
    "VEGETATION",
];

const RESIDENTIAL_CLASSES: &[&str] = &[
    "GEWAECHSHAUS", "UNTERSTAND", "HUT", "SHED", "BARN_BUILDING", "FARM_BUILDING",
    "SCHOOL_BUILDING", "COMMERCIAL_BUILDING", "INDUSTRIAL_BUILDING",
    "DETACHED", "TERRACE", "APPARTEMENTS", "GARAGES", "GARAGE", "CARPORT",
    "HOUSE", "RESIDENTIAL_BUILDING", "BUILDING", "RESIDENTIAL",
    "ASTRONOMIE", "RESEARCH", "LIBRARY", "BESONDERE_SCHULE", "BERUFSSCHULE",
    "GRUNDSCHULE", "HAUPTSCHULE", "REALSCHULE", "GYMNASIUM", "UNIVERSITY", "ACADEMIC",
    "MELDUNGSEINRICHTUNGEN", "ROHRLEITUNG",
    "KLAERWERK", "WASSERTURM", "WASSERHOCHBEHAELTER", "STAUDAMM", "RESERVOIR",
    "BASIN", "BRUNNEN", "WASSERWERK", "WASSERAUFBEREITUNG",
    "TRANSFORMATOR", "TRAFOHAUS", "STROMVERTEILER", "STROMLEITUNG", "STROMMAST",
    "WASSERRAD", "UMSPANNSTATION", "POWER_PLANT_ADDON",
    "MUEHLE", "WASSER_KRAFTWERK", "SOLAR_KRAFTWERK", "WINDMUEHLE", "WINDKRAFTWERK",
    "BRENN_POWER_PLANT", "KOHLE_KRAFTWERK", "OEL_KRAFTWERK", "GAS_KRAFTWERK",
    "POWER_PLANT", "MINING", "INDUSTRIAL",
    "GASTRONOMY",
    "SHOP_MORE", "LESEN_SCHREIBEN", "BAUEN_EINRICHTEN_GARTEN", "ELEKTRONIKSHOP",
    "SPORT_FREIZEIT_SHOP", "KLEIDUNG", "KOERPERPFLEGE", "LEBENSMITTEL", "SHOP",
    "HANDWERK",
    "DIENSTLEISTUNG_AUTO", "FINANZEINRICHTUNG", "POST", "COMMUNICATION", "TOILETS",
    "UNTERHALTUNG_KOMMERZIELL", "NACHTLEBEN", "WEITERE_DIENSTLEISTUNGEN",
    "UEBERNACHTUNGEN",
    "BEHOERDE",
    "KRANKENHAUS", "APOTHEKE", "ARZTPRAXIS", "MEDICAL",
    "SOCIAL_RELIGIOES",
    "UNTERHALTUNGSGEBAEUDE", "TIERPARK", "FREIZEIT",
    "LAENDLICH",
    "COMMERCIAL",
];

const OPEN_AREA_CLASSES: &[&str] = &[
    "MUELLDEPONIE", "UBAHN_GLEISE", "BAHNKONTROLLZENTRUM", "BAHNVERKEHR",
    "BRIDGE", "BRIDGE_RELATION", "STRASSENLAMPE", "BOOTSVERLEIH", "HAFEN_ALL",
    "HUBSCHRAUBER_LANDEPLATZ", "FLUGHAFEN",
    "BUSBAHNHOF", "BUSHALTESTELLE", "U_BAHN_HALTESTELLE", "TRAM_HALTESTELLE",
    "HALTESTELLE", "BAHNHOF",
    "PARKHAUS", "RASTPLATZ", "RASTSTAETTE", "ALLGEMEINER_PARKPLATZ",
    "WERTSTOFFSAMMELSTELLE", "SCHWIMMBAD_ALL",
    "KLETTERN", "RENNBAHN", "GOLFPLATZ", "BASKETBALL_FELD", "BOWLING", "TISCHTENNIS",
    "MINIGOLF", "RUDERN", "FAHRRADFAHREN", "BEACHVOLLEYBALL", "HANDBALL",
    "BOGENSCHIESSEN", "MODELLFLUG", "FUSSBALL", "REITEN", "TENNISPLATZ",
    "SPORTPLATZ", "STADION", "SPORTS_PLACE",
    "GRUENFLAECHE", "NAHERHOLUNGSGEBIET", "CAMPINGPLATZ", "SPIELPLATZ", "HUNDEPARK",
    "GRILLSTELLE", "PICNIC_PLATZ", "GARTEN", "PARK", "GENERAL_PUBLIC_PLACE",
    "PUBLIC_PLACE",
];

const OTHER_CLASSES: &[&str] = &[
    "SITZBANK", "MUELLEIMER", "VERKAUFSAUTOMAT",
    "BEOBACHTUNGSTURM", "TURM", "BEGRENZUNG",
    "ZIERBRUNNEN", "DENKMAL", "SIGHT_POINT",
    "SCHLOSS", "RUINE", "STADTMAUER", "STADTTOR", "HISTORIC",
    "NATIONALPARK", "NATURSCHUTZGEBIET",
    "POLIZEI", "GEFAENGNIS", "FEUERWEHR", "MILITARY", "BUILDINGS_SPECIAL_USAGE",
    "BAUSTELLE",
];

const STREET_CLASSES: &[&str] = &["AUTOBAHN", "KRAFTFAHRSTRASSE", "LANDSTRASSE", "INNERORTSTRASSE_ALL"];

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn group(categories: &[&str], inflate: f64, style: Option<ColorPair>) -> RuleGroup {
    RuleGroup {
        categories: names(categories),
        inflate,
        style,
    }
}

fn solid(r: u8, g: u8, b: u8) -> ColorPair {
    let c = map_common::Color::rgb(r, g, b);
    ColorPair::new(c, c)
}

fn pair(fill: [u8; 4], stroke: [u8; 4]) -> ColorPair {
    use map_common::Color;
    ColorPair::new(
        Color::rgba(fill[0], fill[1], fill[2], fill[3]),
        Color::rgba(stroke[0], stroke[1], stroke[2], stroke[3]),
    )
}

/// The standard layer stack: water, geology, vegetation, residential, open
/// area with streets, other objects.
pub fn default_themes() -> Vec<ThemeSpec> {
    let water = ThemeSpec {
        remainder: RemainderPolicy {
            inflate: 0.0001,
            skip_tags: names(&["tunnel"]),
            tag_inflate: vec![
                TagInflate {
                    tag: "stream".to_string(),
                    inflate: 0.00003,
                },
                TagInflate {
                    tag: "ditch".to_string(),
                    inflate: 0.00003,
                },
            ],
        },
        labels: vec![LabelRule {
            kind: LabelKind::Water,
            anchor: LabelAnchor::InteriorPoint,
            exclude_substrings: names(&["WATER", "FLUSS", "SEE"]),
            ..LabelRule::default()
        }],
        ..ThemeSpec::new("water", "WATER")
    };

    let geology = ThemeSpec {
        style: Some(pair([95, 103, 112, 255], [92, 91, 77, 236])),
        ..ThemeSpec::new("geology", "GEOLOGY")
    };

    let vegetation = ThemeSpec {
        style: Some(pair([42, 195, 20, 255], [39, 181, 21, 255])),
        rules: vec![group(VEGETATION_CLASSES, 0.00001, None)],
        ..ThemeSpec::new("vegetation", "VEGETATION")
    };

    let residential = ThemeSpec {
        style: Some(pair([149, 6, 49, 180], [87, 2, 21, 236])),
        rules: vec![group(RESIDENTIAL_CLASSES, 0.00002, None)],
        ..ThemeSpec::new("residential", "INHABITED")
    };

    let open_area = ThemeSpec {
        style: Some(pair([237, 222, 107, 255], [200, 190, 73, 236])),
        streets: Some(StreetSpec {
            category: "STRASSEN_WEGE".to_string(),
            classes: names(STREET_CLASSES),
            style_category: "INNERORTSTRASSE_ALL".to_string(),
            inflate: 0.000026,
            remainder_inflate: 0.00003,
        }),
        rules: vec![
            group(&["GLEISKOERPER"], 0.00001, Some(solid(43, 37, 37))),
            group(&["TRAM_GLEISE"], 0.00001, Some(solid(21, 20, 20))),
            group(&["HALTESTELLE"], 0.00001, Some(solid(168, 134, 134))),
            group(OPEN_AREA_CLASSES, 0.00002, None),
        ],
        discard: names(&["TRAFFIC_MORE", "BAHNSTEIG"]),
        ..ThemeSpec::new("openarea", "OPENAREA")
    };

    let others = ThemeSpec {
        style: Some(pair([227, 91, 91, 221], [214, 96, 109, 216])),
        rules: vec![group(OTHER_CLASSES, 0.00002, None)],
        discard: names(&["WASSERSCHUTZGEBIET", "SCHUTZGEBIET", "HYDRANT", "MEILENSTEIN"]),
        labels: vec![LabelRule {
            primary: Some(CodeRange::single(93140000)),
            require_tag: Some("attraction=animal".to_string()),
            exclude_names: names(&["Leer"]),
            ..LabelRule::default()
        }],
        ..ThemeSpec::new("others", "OTHER_OBJECTS")
    };

    vec![water, geology, vegetation, residential, open_area, others]
}
