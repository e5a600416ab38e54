//! End-to-end assembly and validation tests

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use modelpak::assemble::{
    Assembler, AssemblyJob, AssemblyOptions, MotionPlan, PhysicsPlan, TemplateSelection,
    TexturePlan, batch_assemble,
};
use modelpak::descriptor::{ModelDescriptor, MotionRef, PhysicsDocument};
use modelpak::index::ModelIndex;
use modelpak::texture::{PlaceholderSynthesizer, TextureSynthesizer};
use modelpak::validate::{REPORT_FILENAME, validate_from_index, validate_package};

const MOTION: &str = r#"{
    "Version": 3,
    "Meta": {"Duration": 2.0, "Fps": 30.0, "Loop": true, "CurveCount": 2},
    "Curves": [
        {"Target": "Parameter", "Id": "ParamAngleX", "Segments": [0.0, 0.0, 1.0, 1.0, 5.0]},
        {"Target": "Parameter", "Id": "ParamEyeLOpen", "Segments": [0.0, 1.0]}
    ]
}"#;

const EXPRESSION: &str = r#"{
    "Type": "Live2D Expression",
    "FadeInTime": 0.3,
    "FadeOutTime": 0.3,
    "Parameters": [{"Id": "ParamMouthForm", "Value": 1.0, "Blend": "Add"}]
}"#;

const PHYSICS: &str = r#"{
    "Version": 3,
    "PhysicsSettings": [{
        "Outputs": [{"Scale": 2.0, "Weight": 100.0}],
        "Particles": [{"Mobility": 0.95, "Delay": 0.8, "Acceleration": 1.5, "Radius": 15.0}]
    }]
}"#;

/// Write a complete template package under `dir` and return its index entry.
fn write_template(dir: &Path, model_id: &str) -> serde_json::Value {
    fs::write(dir.join("model.moc3"), b"moc-bytes").unwrap();
    fs::write(dir.join("model.physics3.json"), PHYSICS).unwrap();
    fs::write(dir.join("model.pose3.json"), r#"{"Type": "Live2D Pose"}"#).unwrap();
    fs::create_dir_all(dir.join("textures")).unwrap();
    PlaceholderSynthesizer
        .synthesize(&dir.join("textures/tex_00.png"), 64, 64)
        .unwrap();
    PlaceholderSynthesizer
        .synthesize(&dir.join("textures/tex_01.png"), 32, 32)
        .unwrap();
    fs::create_dir_all(dir.join("mtn")).unwrap();
    fs::write(dir.join("mtn/x.motion3.json"), MOTION).unwrap();
    fs::create_dir_all(dir.join("exp")).unwrap();
    fs::write(dir.join("exp/smile.exp3.json"), EXPRESSION).unwrap();

    fs::write(
        dir.join(format!("{model_id}.model3.json")),
        r#"{
            "Version": 3,
            "FileReferences": {
                "Moc": "model.moc3",
                "Textures": ["textures/tex_00.png", "textures/tex_01.png"],
                "Physics": "model.physics3.json",
                "Pose": "model.pose3.json",
                "Motions": {"Idle": [{"File": "mtn/x.motion3.json", "Name": "x"}]},
                "Expressions": [{"Name": "smile", "File": "exp/smile.exp3.json"}]
            },
            "Groups": [
                {"Target": "Parameter", "Name": "Angles",
                 "Ids": ["ParamAngleX", "ParamEyeLOpen"]}
            ]
        }"#,
    )
    .unwrap();

    serde_json::json!({
        "model_id": model_id,
        "model_path": dir,
        "textures": ["textures/tex_00.png", "textures/tex_01.png"],
        "texture_count": 2,
        "motion_count": 1,
        "expression_count": 1,
        "physics_path": "model.physics3.json",
        "pose_path": "model.pose3.json"
    })
}

fn index_with(entries: Vec<serde_json::Value>) -> ModelIndex {
    serde_json::from_value(serde_json::json!({ "models": entries })).unwrap()
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

#[test]
fn clone_build_produces_a_valid_package() {
    init_tracing();
    let template_dir = TempDir::new().unwrap();
    let out_root = TempDir::new().unwrap();
    let index = index_with(vec![write_template(template_dir.path(), "100100")]);

    let assembler = Assembler::new(AssemblyOptions::new(out_root.path()));
    let job = AssemblyJob::clone_template(
        "cloned_model",
        TemplateSelection::Specified("100100".to_string()),
    );

    let outcome = assembler.assemble(&job, &index).unwrap();
    assert_eq!(outcome.template_id, "100100");
    assert_eq!(outcome.warnings, Vec::<String>::new());

    let out_dir = out_root.path().join("cloned_model");
    assert!(out_dir.join("cloned_model.model3.json").exists());
    assert!(out_dir.join("model.model3.json").exists());
    assert!(out_dir.join("model.moc3").exists());
    assert!(out_dir.join("model.physics3.json").exists());
    assert!(out_dir.join("model.pose3.json").exists());
    assert!(out_dir.join("mtn/x.motion3.json").exists());
    assert!(out_dir.join("exp/smile.exp3.json").exists());
    assert!(out_dir.join("textures/tex_00.png").exists());

    let validation = outcome.validation.unwrap();
    assert_eq!(validation.errors, Vec::<String>::new());
    assert!(validation.is_valid);
    assert!(validation.warnings.is_empty());

    // staged bytes are identical to the template's
    assert_eq!(
        fs::read(out_dir.join("model.moc3")).unwrap(),
        fs::read(template_dir.path().join("model.moc3")).unwrap()
    );
}

#[test]
fn generation_build_merges_fragments_and_validates() {
    init_tracing();
    let template_dir = TempDir::new().unwrap();
    let out_root = TempDir::new().unwrap();
    let index = index_with(vec![write_template(template_dir.path(), "200200")]);

    // the generation collaborators write their fragments under the unit's
    // output directory before assembly runs
    let out_dir = out_root.path().join("generated_model");
    fs::create_dir_all(out_dir.join("mtn")).unwrap();
    fs::write(out_dir.join("mtn/y.motion3.json"), MOTION).unwrap();
    fs::create_dir_all(out_dir.join("gen")).unwrap();
    let tweaked = PhysicsDocument::load(&template_dir.path().join("model.physics3.json"))
        .unwrap()
        .scaled(1.05);
    fs::write(
        out_dir.join("gen/tweaked.physics3.json"),
        tweaked.to_json_bytes().unwrap(),
    )
    .unwrap();

    let mut new_motions = IndexMap::new();
    new_motions.insert(
        "Idle".to_string(),
        vec![
            MotionRef {
                file: "mtn/x.motion3.json".to_string(),
                name: Some("dup".to_string()),
                extra: IndexMap::new(),
            },
            MotionRef {
                file: "mtn/y.motion3.json".to_string(),
                name: Some("new".to_string()),
                extra: IndexMap::new(),
            },
        ],
    );

    let job = AssemblyJob {
        output_name: "generated_model".to_string(),
        selection: TemplateSelection::SimilarTextureCount(2),
        textures: TexturePlan::Replace(vec![
            "textures/tex_00.png".to_string(),
            "textures/brand_new.png".to_string(),
        ]),
        motions: MotionPlan::Add(new_motions),
        expressions: modelpak::assemble::ExpressionPlan::Reuse,
        physics: PhysicsPlan::Replace("gen/tweaked.physics3.json".to_string()),
    };

    let assembler = Assembler::new(AssemblyOptions::new(out_root.path()));
    let outcome = assembler.assemble(&job, &index).unwrap();

    let manifest = ModelDescriptor::load(&outcome.manifest_path).unwrap();
    assert_eq!(
        manifest.file_references.textures,
        vec!["textures/tex_00.png", "textures/brand_new.png"]
    );
    assert_eq!(
        manifest.file_references.physics.as_deref(),
        Some("gen/tweaked.physics3.json")
    );
    let idle = &manifest.file_references.motions["Idle"];
    assert_eq!(idle.len(), 2);
    assert_eq!(idle[0].name.as_deref(), Some("x"));
    assert_eq!(idle[1].file, "mtn/y.motion3.json");

    // tex_00 copied from the template, brand_new synthesized as a placeholder
    assert_eq!(
        fs::read(out_dir.join("textures/tex_00.png")).unwrap(),
        fs::read(template_dir.path().join("textures/tex_00.png")).unwrap()
    );
    assert!(out_dir.join("textures/brand_new.png").exists());

    let validation = outcome.validation.unwrap();
    assert_eq!(validation.errors, Vec::<String>::new());
    assert!(validation.is_valid);
}

#[test]
fn batch_assembly_and_index_validation_round_trip() {
    init_tracing();
    let template_dir = TempDir::new().unwrap();
    let out_root = TempDir::new().unwrap();
    let index = index_with(vec![write_template(template_dir.path(), "300300")]);

    let assembler = Assembler::new(AssemblyOptions::new(out_root.path()));
    let jobs = vec![
        AssemblyJob::clone_template(
            "batch_a",
            TemplateSelection::Specified("300300".to_string()),
        ),
        AssemblyJob::clone_template("batch_b", TemplateSelection::Random),
        AssemblyJob::clone_template(
            "batch_broken",
            TemplateSelection::Specified("does_not_exist".to_string()),
        ),
    ];

    let batch = batch_assemble(&assembler, &jobs, &index, 2, |_| {}).unwrap();
    assert_eq!(batch.success_count, 2);
    assert_eq!(batch.fail_count, 1);
    assert!(batch.results.iter().any(|r| r.contains("batch_broken")));

    // validate the produced packages through the batch validator
    let produced = index_with(vec![
        serde_json::json!({
            "model_id": "batch_a",
            "model_path": out_root.path().join("batch_a")
        }),
        serde_json::json!({
            "model_id": "batch_b",
            "model_path": out_root.path().join("batch_b")
        }),
    ]);
    let report_dir = TempDir::new().unwrap();
    let report = validate_from_index(
        &produced,
        Path::new("produced-index.json"),
        report_dir.path(),
        None,
        |_| {},
    )
    .unwrap();

    assert_eq!(report.statistics.total_validated, 2);
    assert_eq!(report.statistics.valid_models, 2);
    assert_eq!(report.statistics.invalid_models, 0);
    assert!(report_dir.path().join(REPORT_FILENAME).exists());
}

#[test]
fn interrupted_unit_recovers_on_rerun() {
    init_tracing();
    let template_dir = TempDir::new().unwrap();
    let out_root = TempDir::new().unwrap();
    let index = index_with(vec![write_template(template_dir.path(), "400400")]);

    // simulate a partially staged output directory from an interrupted run
    let out_dir = out_root.path().join("recovered");
    fs::create_dir_all(&out_dir).unwrap();
    fs::write(out_dir.join("model.moc3"), b"truncated").unwrap();

    let assembler = Assembler::new(AssemblyOptions::new(out_root.path()));
    let job = AssemblyJob::clone_template(
        "recovered",
        TemplateSelection::Specified("400400".to_string()),
    );
    let outcome = assembler.assemble(&job, &index).unwrap();

    // the re-run restages over the partial state
    assert_eq!(
        fs::read(out_dir.join("model.moc3")).unwrap(),
        fs::read(template_dir.path().join("model.moc3")).unwrap()
    );
    assert!(outcome.validation.unwrap().is_valid);
}

#[test]
fn missing_package_validation_never_panics() {
    let result = validate_package(Path::new("/nonexistent/package"));
    assert!(!result.is_valid);
    assert_eq!(result.errors.len(), 1);
}
