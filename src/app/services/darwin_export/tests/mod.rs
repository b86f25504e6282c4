//! Tests for the Darwin Core export

pub mod writer_tests;

use crate::app::models::{DetectionEntity, TaxonRank, TaxonRecord};
use crate::app::services::darwin_export::ExportContext;
use crate::app::services::identification::{IdentificationContext, IdentificationInput, identify};

pub const TEST_NIGHT_PATH: &str = "panama/Gamboa/Deployment1/2025-06-22";
pub const TEST_PHOTO: &str = "2025_06_22__23_41_07";

pub fn create_test_export_context() -> ExportContext {
    ExportContext::new(TEST_NIGHT_PATH).with_identifier("AB")
}

pub fn create_test_detection(id: &str) -> DetectionEntity {
    let mut detection = DetectionEntity::new_auto(id, id, TEST_PHOTO, TEST_NIGHT_PATH);
    detection.score = Some(0.5);
    detection.cluster_id = Some(3);
    detection.patch_path = Some(format!("patches/{}.jpg", id));
    detection
}

pub fn create_diptera_detection(id: &str) -> DetectionEntity {
    let mut detection = create_test_detection(id);
    detection.taxon = Some(
        TaxonRecord::new(TaxonRank::Order, "Diptera")
            .with_rank(TaxonRank::Kingdom, "Animalia")
            .with_rank(TaxonRank::Order, "Diptera"),
    );
    detection.label = "Diptera".to_string();
    detection
}

pub fn apply(detection: &DetectionEntity, input: IdentificationInput) -> DetectionEntity {
    let outcome = identify(detection, &input, &IdentificationContext::at(1_750_636_800_000));
    assert!(!outcome.skipped());
    outcome.detection
}
