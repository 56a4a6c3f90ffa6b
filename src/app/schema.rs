//! Entity catalogue for the NREL lab notebook
//!
//! Each notebook entity is a plain record plus the [`EntryData`] capability
//! marker. The display directives a notebook renderer consumes (hidden
//! quantities, property order, template defaults, plot axes) are static
//! configuration attached to [`EntityKind`]; nothing here renders them.

use serde::Serialize;

use crate::constants::{DEFAULT_LAB_ID_LENGTH, LAB_ID_ALPHABET};

/// Capability marker for records the host can manage as notebook entries
pub trait EntryData {
    /// Catalogue entry describing this record
    fn entity_kind(&self) -> EntityKind;

    /// Display name of the entry
    fn entry_name(&self) -> &str;
}

/// Default value pre-filled when a new entity is created
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TemplateValue {
    Number(f64),
    Text(&'static str),
}

/// Plot directive: quantity paths for the x and y axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlotAnnotation {
    pub x: &'static str,
    pub y: &'static str,
    pub show_legend: bool,
}

/// Static display configuration of an entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EntityAnnotations {
    pub hide: &'static [&'static str],
    pub order: &'static [&'static str],
    pub template: &'static [(&'static str, TemplateValue)],
    pub plot: Option<PlotAnnotation>,
    pub label_quantity: Option<&'static str>,
}

impl EntityAnnotations {
    const fn new(hide: &'static [&'static str], order: &'static [&'static str]) -> Self {
        Self {
            hide,
            order,
            template: &[],
            plot: None,
            label_quantity: None,
        }
    }

    const fn with_template(mut self, template: &'static [(&'static str, TemplateValue)]) -> Self {
        self.template = template;
        self
    }

    const fn with_plot(mut self, plot: PlotAnnotation) -> Self {
        self.plot = Some(plot);
        self
    }

    const fn with_label(mut self, label_quantity: &'static str) -> Self {
        self.label_quantity = Some(label_quantity);
        self
    }

    /// Whether a quantity is hidden in the notebook view
    pub fn is_hidden(&self, quantity: &str) -> bool {
        self.hide.contains(&quantity)
    }

    /// Position of a quantity in the property order, if listed
    pub fn order_of(&self, quantity: &str) -> Option<usize> {
        self.order.iter().position(|q| *q == quantity)
    }
}

// =============================================================================
// Shared directive lists
// =============================================================================

const PROCESS_HIDE: &[&str] = &["lab_id", "users", "end_time", "steps", "instruments", "results"];
const GENERIC_HIDE: &[&str] = &[
    "lab_id",
    "users",
    "location",
    "end_time",
    "steps",
    "instruments",
    "results",
];
const SAMPLE_HIDE: &[&str] = &["users", "components", "elemental_composition"];
const LAYER_ORDER: &[&str] = &["name", "location", "present", "datetime", "batch", "samples", "layer"];
const COATING_ORDER: &[&str] = &[
    "name",
    "location",
    "present",
    "datetime",
    "batch",
    "samples",
    "solution",
    "layer",
    "quenching",
    "annealing",
];
const ABSORBER_TEMPLATE: &[(&str, TemplateValue)] =
    &[("layer_type", TemplateValue::Text("Absorber Layer"))];
const SOLUTION_TEMPLATE: &[(&str, TemplateValue)] = &[
    ("temperature", TemplateValue::Number(45.0)),
    ("time", TemplateValue::Number(15.0)),
    ("method", TemplateValue::Text("Shaker")),
];

/// Entities defined by the NREL notebook package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EntityKind {
    VoilaNotebook,
    Substrate,
    Solution,
    Ink,
    Sample,
    BasicSample,
    Batch,
    Cleaning,
    InkjetPrinting,
    SpinCoating,
    DipCoating,
    BladeCoating,
    SlotDieCoating,
    Sputtering,
    AtomicLayerDeposition,
    Evaporation,
    LaserScribing,
    JvMeasurement,
    EqeMeasurement,
    Process,
    WetChemicalDeposition,
    Deposition,
    Measurement,
}

impl EntityKind {
    /// Every catalogued entity
    pub const ALL: [EntityKind; 23] = [
        EntityKind::VoilaNotebook,
        EntityKind::Substrate,
        EntityKind::Solution,
        EntityKind::Ink,
        EntityKind::Sample,
        EntityKind::BasicSample,
        EntityKind::Batch,
        EntityKind::Cleaning,
        EntityKind::InkjetPrinting,
        EntityKind::SpinCoating,
        EntityKind::DipCoating,
        EntityKind::BladeCoating,
        EntityKind::SlotDieCoating,
        EntityKind::Sputtering,
        EntityKind::AtomicLayerDeposition,
        EntityKind::Evaporation,
        EntityKind::LaserScribing,
        EntityKind::JvMeasurement,
        EntityKind::EqeMeasurement,
        EntityKind::Process,
        EntityKind::WetChemicalDeposition,
        EntityKind::Deposition,
        EntityKind::Measurement,
    ];

    /// Section name registered with the host
    pub fn section_name(&self) -> &'static str {
        match self {
            EntityKind::VoilaNotebook => "NREL_VoilaNotebook",
            EntityKind::Substrate => "NREL_Substrate",
            EntityKind::Solution => "NREL_Solution",
            EntityKind::Ink => "NREL_Ink",
            EntityKind::Sample => "NREL_Sample",
            EntityKind::BasicSample => "NREL_BasicSample",
            EntityKind::Batch => "NREL_Batch",
            EntityKind::Cleaning => "NREL_Cleaning",
            EntityKind::InkjetPrinting => "NREL_Inkjet_Printing",
            EntityKind::SpinCoating => "NREL_SpinCoating",
            EntityKind::DipCoating => "NREL_DipCoating",
            EntityKind::BladeCoating => "NREL_BladeCoating",
            EntityKind::SlotDieCoating => "NREL_SlotDieCoating",
            EntityKind::Sputtering => "NREL_Sputtering",
            EntityKind::AtomicLayerDeposition => "NREL_AtomicLayerDeposition",
            EntityKind::Evaporation => "NREL_Evaporation",
            EntityKind::LaserScribing => "NREL_LaserScribing",
            EntityKind::JvMeasurement => "NREL_JVmeasurement",
            EntityKind::EqeMeasurement => "NREL_EQEmeasurement",
            EntityKind::Process => "NREL_Process",
            EntityKind::WetChemicalDeposition => "NREL_WetChemicalDepoistion",
            EntityKind::Deposition => "NREL_Deposition",
            EntityKind::Measurement => "NREL_Measurement",
        }
    }

    /// Look up an entity by its section name
    pub fn from_section_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.section_name() == name)
    }

    /// Display directives for this entity
    pub fn annotations(&self) -> EntityAnnotations {
        match self {
            EntityKind::VoilaNotebook => EntityAnnotations::new(&["lab_id"], &[]),
            EntityKind::Substrate => EntityAnnotations::new(
                &["lab_id", "users", "components", "elemental_composition"],
                &[
                    "name",
                    "substrate",
                    "conducting_material",
                    "solar_cell_area",
                    "pixel_area",
                    "number_of_pixels",
                ],
            ),
            EntityKind::Solution => EntityAnnotations::new(
                &[
                    "users",
                    "components",
                    "elemental_composition",
                    "method",
                    "temperature",
                    "time",
                    "speed",
                    "solvent_ratio",
                    "washing",
                ],
                &[
                    "name",
                    "datetime",
                    "lab_id",
                    "description",
                    "preparation",
                    "solute",
                    "solvent",
                    "other_solution",
                    "additive",
                    "storage",
                ],
            )
            .with_template(SOLUTION_TEMPLATE),
            EntityKind::Ink => EntityAnnotations::new(
                &["users", "components", "elemental_composition", "chemical_formula"],
                &["name", "method", "temperature", "time", "speed", "solvent_ratio"],
            )
            .with_template(SOLUTION_TEMPLATE),
            EntityKind::Sample => {
                EntityAnnotations::new(SAMPLE_HIDE, &["name", "substrate", "architecture"])
                    .with_label("sample_id")
            }
            EntityKind::BasicSample => {
                EntityAnnotations::new(SAMPLE_HIDE, &[]).with_label("sample_id")
            }
            EntityKind::Batch => EntityAnnotations::new(
                &["users", "samples"],
                &["name", "export_batch_ids", "csv_export_file"],
            ),
            EntityKind::Cleaning => EntityAnnotations::new(
                PROCESS_HIDE,
                &[
                    "name",
                    "location",
                    "present",
                    "datetime",
                    "previous_process",
                    "batch",
                    "samples",
                ],
            ),
            EntityKind::InkjetPrinting => EntityAnnotations::new(
                PROCESS_HIDE,
                &[
                    "name",
                    "location",
                    "present",
                    "recipe_used",
                    "print_head_used",
                    "datetime",
                    "previous_process",
                    "batch",
                    "samples",
                    "solution",
                    "layer",
                    "properties",
                    "print_head_path",
                    "nozzle_voltage_profile",
                    "quenching",
                    "annealing",
                ],
            )
            .with_template(ABSORBER_TEMPLATE),
            EntityKind::SpinCoating => EntityAnnotations::new(
                &[
                    "lab_id",
                    "users",
                    "end_time",
                    "steps",
                    "instruments",
                    "results",
                    "recipe",
                ],
                &[
                    "name",
                    "location",
                    "present",
                    "recipe",
                    "datetime",
                    "previous_process",
                    "batch",
                    "samples",
                    "solution",
                    "layer",
                    "quenching",
                    "annealing",
                ],
            )
            .with_template(ABSORBER_TEMPLATE),
            EntityKind::DipCoating => {
                EntityAnnotations::new(PROCESS_HIDE, COATING_ORDER).with_template(ABSORBER_TEMPLATE)
            }
            EntityKind::BladeCoating => EntityAnnotations::new(PROCESS_HIDE, COATING_ORDER),
            EntityKind::SlotDieCoating => EntityAnnotations::new(
                &[
                    "lab_id",
                    "users",
                    "author",
                    "end_time",
                    "steps",
                    "instruments",
                    "results",
                ],
                &[
                    "name",
                    "location",
                    "present",
                    "datetime",
                    "previous_process",
                    "batch",
                    "samples",
                    "solution",
                    "layer",
                    "properties",
                    "quenching",
                    "annealing",
                ],
            )
            .with_template(ABSORBER_TEMPLATE),
            EntityKind::Sputtering
            | EntityKind::AtomicLayerDeposition
            | EntityKind::Evaporation => EntityAnnotations::new(PROCESS_HIDE, LAYER_ORDER),
            EntityKind::LaserScribing => EntityAnnotations::new(
                PROCESS_HIDE,
                &["name", "location", "present", "datetime", "batch", "samples"],
            ),
            EntityKind::JvMeasurement => EntityAnnotations::new(
                &[
                    "lab_id",
                    "solution",
                    "users",
                    "author",
                    "certified_values",
                    "certification_institute",
                    "end_time",
                    "steps",
                    "instruments",
                    "results",
                ],
                &[
                    "name",
                    "data_file",
                    "active_area",
                    "intensity",
                    "integration_time",
                    "settling_time",
                    "averaging",
                    "compliance",
                    "samples",
                ],
            )
            .with_plot(PlotAnnotation {
                x: "jv_curve/:/voltage",
                y: "jv_curve/:/current_density",
                show_legend: true,
            }),
            EntityKind::EqeMeasurement => EntityAnnotations::new(
                &[
                    "lab_id",
                    "solution",
                    "users",
                    "location",
                    "end_time",
                    "steps",
                    "instruments",
                    "results",
                    "data",
                    "header_lines",
                ],
                &["name", "data_file", "samples"],
            )
            .with_plot(PlotAnnotation {
                x: "eqe_data/:/photon_energy_array",
                y: "eqe_data/:/eqe_array",
                show_legend: true,
            }),
            EntityKind::Process => {
                EntityAnnotations::new(GENERIC_HIDE, &["name", "present", "data_file", "batch", "samples"])
            }
            EntityKind::WetChemicalDeposition => EntityAnnotations::new(
                GENERIC_HIDE,
                &[
                    "name",
                    "present",
                    "datetime",
                    "previous_process",
                    "batch",
                    "samples",
                    "solution",
                    "layer",
                    "quenching",
                    "annealing",
                ],
            ),
            EntityKind::Deposition => EntityAnnotations::new(
                GENERIC_HIDE,
                &[
                    "name",
                    "present",
                    "datetime",
                    "previous_process",
                    "batch",
                    "samples",
                    "layer",
                ],
            ),
            EntityKind::Measurement => {
                EntityAnnotations::new(GENERIC_HIDE, &["name", "data_file", "samples", "solution"])
            }
        }
    }
}

// =============================================================================
// Lab Identifiers
// =============================================================================

/// Build a lab identifier from an explicit randomness source
///
/// Each byte drawn from `source` selects one character of `A-Z0-9`. The result
/// is shorter than `len` if the source runs dry.
pub fn random_lab_id<I>(source: I, len: usize) -> String
where
    I: IntoIterator<Item = u8>,
{
    source
        .into_iter()
        .take(len)
        .map(|b| LAB_ID_ALPHABET[b as usize % LAB_ID_ALPHABET.len()] as char)
        .collect()
}

/// Lab identifier of the default length drawn from a v4 UUID
pub fn fresh_lab_id() -> String {
    // Bytes 0-5 of a v4 UUID carry no version/variant bits.
    random_lab_id(uuid::Uuid::new_v4().into_bytes(), DEFAULT_LAB_ID_LENGTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_section_names_unique_and_reversible() {
        let names: HashSet<&str> = EntityKind::ALL.iter().map(|k| k.section_name()).collect();
        assert_eq!(names.len(), EntityKind::ALL.len());

        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::from_section_name(kind.section_name()), Some(kind));
        }
        assert_eq!(EntityKind::from_section_name("NREL_Unknown"), None);
    }

    #[test]
    fn test_jv_measurement_annotations() {
        let annotations = EntityKind::JvMeasurement.annotations();

        assert!(annotations.is_hidden("lab_id"));
        assert!(!annotations.is_hidden("active_area"));
        assert_eq!(annotations.order_of("name"), Some(0));
        assert_eq!(annotations.order_of("intensity"), Some(3));

        let plot = annotations.plot.unwrap();
        assert_eq!(plot.x, "jv_curve/:/voltage");
        assert_eq!(plot.y, "jv_curve/:/current_density");
    }

    #[test]
    fn test_templates() {
        let solution = EntityKind::Solution.annotations();
        assert!(solution.template.contains(&("method", TemplateValue::Text("Shaker"))));

        let spin = EntityKind::SpinCoating.annotations();
        assert_eq!(spin.template, ABSORBER_TEMPLATE);
        assert_eq!(EntityKind::Sample.annotations().label_quantity, Some("sample_id"));
    }

    #[test]
    fn test_random_lab_id_is_deterministic_for_source() {
        let id = random_lab_id([0u8, 25, 26, 35, 36, 255], 6);
        assert_eq!(id, "AZ09AD");
        assert_eq!(random_lab_id([1u8, 2], 6), "BC");
    }

    #[test]
    fn test_fresh_lab_id_shape() {
        let id = fresh_lab_id();
        assert_eq!(id.len(), DEFAULT_LAB_ID_LENGTH);
        assert!(id.bytes().all(|b| LAB_ID_ALPHABET.contains(&b)));
    }
}
