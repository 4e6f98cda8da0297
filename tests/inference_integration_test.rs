//! Integration tests verifying that exported classifiers evaluate to the
//! same outputs as the burn models they were exported from.

use binmlp::data::{Standardizer, TabularItem, build_loader};
use binmlp::export::{InstructionExport, InstructionModel, InstructionModelExport};
use binmlp::model::{BinaryClassifier, BinaryClassifierConfig};
use binmlp::training::{TrainingConfig, train};
use burn::backend::{Autodiff, NdArray};
use burn::module::AutodiffModule;
use burn::tensor::{Tensor, backend::Backend};

type TestBackend = NdArray;
type TrainingBackend = Autodiff<NdArray>;

const TOLERANCE: f32 = 1e-5;

fn floats_close(a: f32, b: f32, tolerance: f32) -> bool {
    (a - b).abs() < tolerance
}

fn burn_output(model: &BinaryClassifier<TestBackend>, input: &[f32]) -> Vec<f32> {
    let device = <TestBackend as Backend>::Device::default();
    let input_tensor =
        Tensor::<TestBackend, 1>::from_floats(input, &device).reshape([1, input.len()]);
    model.infer(input_tensor).to_data().to_vec().unwrap()
}

fn assert_equivalent(
    model: &BinaryClassifier<TestBackend>,
    inference_model: &InstructionModel,
    raw: &[f32],
    standardizer: Option<&Standardizer>,
) {
    let mut standardized = raw.to_vec();
    if let Some(standardizer) = standardizer {
        standardizer.transform_row(&mut standardized).unwrap();
    }

    let burn_result = burn_output(model, &standardized);
    let inference_result = inference_model
        .predict(raw)
        .expect("Inference should succeed");

    assert_eq!(burn_result.len(), inference_result.len());
    for (burn_val, inference_val) in burn_result.iter().zip(inference_result.iter()) {
        assert!(
            floats_close(*burn_val, *inference_val, TOLERANCE),
            "Mismatch for input {:?}: burn={}, inference={}",
            raw,
            burn_val,
            inference_val
        );
    }
}

#[test]
fn test_single_hidden_layer_equivalence() {
    let device = <TestBackend as Backend>::Device::default();

    let model: BinaryClassifier<TestBackend> = BinaryClassifierConfig::new(2)
        .init(&device)
        .expect("Model build should succeed");

    let json = model
        .export_to_instruction_model(None, None)
        .expect("Export should succeed");
    let model_info: InstructionModelExport =
        serde_json::from_str(&json).expect("JSON should be valid");
    let inference_model =
        InstructionModel::new(model_info).expect("Inference model creation should succeed");

    for input in [[1.0f32, 2.0], [-3.0, 0.5], [0.0, 0.0]] {
        assert_equivalent(&model, &inference_model, &input, None);
    }
}

#[test]
fn test_deep_network_equivalence() {
    let device = <TestBackend as Backend>::Device::default();

    let model: BinaryClassifier<TestBackend> = BinaryClassifierConfig::new(5)
        .with_hidden_sizes(vec![16, 8, 4])
        .init(&device)
        .expect("Model build should succeed");

    let inference_model =
        InstructionModel::new(model.to_instruction_model_info(None, None).unwrap()).unwrap();
    assert_eq!(inference_model.info().buffer_sizes, vec![5, 16, 8, 4, 1]);

    let rows: Vec<Vec<f32>> = (0..10)
        .map(|i| (0..5).map(|j| ((i * 5 + j) as f32 * 0.37).sin() * 3.0).collect())
        .collect();
    for row in &rows {
        assert_equivalent(&model, &inference_model, row, None);
    }

    let batch = inference_model.predict_batch(&rows).unwrap();
    assert_eq!(batch.len(), rows.len());
}

#[test]
fn test_standardization_prelude_equivalence() {
    let device = <TestBackend as Backend>::Device::default();

    let model: BinaryClassifier<TestBackend> = BinaryClassifierConfig::new(3)
        .with_hidden_sizes(vec![6])
        .init(&device)
        .expect("Model build should succeed");

    let raw_rows = vec![
        vec![120.0, 0.5, -4.0],
        vec![80.0, 0.9, 2.0],
        vec![100.0, 0.1, 0.0],
        vec![95.0, 0.4, 7.5],
    ];
    let standardizer = Standardizer::fit(&raw_rows).unwrap();

    let export = model
        .to_instruction_model_info(None, Some(&standardizer))
        .unwrap();
    assert!(matches!(
        export.instructions[0],
        InstructionExport::AddElementwise { input: 0, .. }
    ));
    assert!(matches!(
        export.instructions[1],
        InstructionExport::MulElementwise { input: 0, .. }
    ));

    let inference_model = InstructionModel::new(export).unwrap();
    for row in &raw_rows {
        assert_equivalent(&model, &inference_model, row, Some(&standardizer));
    }
}

#[test]
fn test_export_json_format() {
    let device = <TestBackend as Backend>::Device::default();

    let model: BinaryClassifier<TestBackend> = BinaryClassifierConfig::new(2)
        .with_hidden_sizes(vec![3])
        .init(&device)
        .expect("Model build should succeed");

    let names = vec!["feature_a".to_string(), "feature_b".to_string()];
    let export = model
        .to_instruction_model_info(Some(names.as_slice()), None)
        .unwrap();

    assert_eq!(export.features, Some(names));
    assert_eq!(export.feature_size, Some(2));
    assert_eq!(export.buffer_sizes, vec![2, 3, 1]);
    assert_eq!(export.instructions.len(), 2);
    assert_eq!(export.weights.len(), 2);
    assert_eq!(export.bias.len(), 2);

    assert_eq!(export.weights[0].len(), 3);
    assert_eq!(export.weights[0][0].len(), 2);
    assert_eq!(export.weights[1].len(), 1);
    assert_eq!(export.weights[1][0].len(), 3);

    let json: serde_json::Value =
        serde_json::from_str(&model.export_to_instruction_model(None, None).unwrap()).unwrap();
    assert_eq!(json["instructions"][0]["type"], "DOT");
    assert_eq!(json["instructions"][0]["activation"], "LEAKY_RELU");
    assert_eq!(json["instructions"][1]["activation"], "SIGMOID");
}

#[test]
fn test_trained_model_inference_equivalence() {
    let device = <TrainingBackend as Backend>::Device::default();

    let model: BinaryClassifier<TrainingBackend> = BinaryClassifierConfig::new(2)
        .with_hidden_sizes(vec![8])
        .init(&device)
        .expect("Model build should succeed");

    let inputs = vec![
        vec![0.0, 0.0],
        vec![0.0, 1.0],
        vec![1.0, 0.0],
        vec![1.0, 1.0],
    ];
    let targets = [0.0, 0.0, 0.0, 1.0];
    let items: Vec<TabularItem> = (0..16)
        .map(|i| TabularItem {
            features: inputs[i % 4].clone(),
            label: targets[i % 4],
        })
        .collect();
    let loader = build_loader::<TrainingBackend>(items, 4, 5, &device);

    let config = TrainingConfig::new()
        .epochs(100)
        .learning_rate(0.05)
        .scheduler(0, 1.0)
        .verbose(false);

    let result = train(model, &loader, None, &config).unwrap();
    let history = result.metrics.train_loss_history();
    assert!(
        history[history.len() - 1] < history[0],
        "Training should reduce loss"
    );

    let trained_model = result.model.valid();
    let json = trained_model
        .export_to_instruction_model(None, None)
        .expect("Export should succeed");
    let inference_model = InstructionModel::from_json(&json).unwrap();

    for input in &inputs {
        assert_equivalent(&trained_model, &inference_model, input, None);
    }

    let prediction_11 = inference_model.predict(&[1.0, 1.0]).unwrap()[0];
    let prediction_00 = inference_model.predict(&[0.0, 0.0]).unwrap()[0];
    assert!(
        prediction_11 > prediction_00,
        "Model should predict higher for (1,1) than (0,0)"
    );
}

#[test]
fn test_embedded_validation_data() {
    let device = <TestBackend as Backend>::Device::default();

    let model: BinaryClassifier<TestBackend> = BinaryClassifierConfig::new(2)
        .init(&device)
        .expect("Model build should succeed");
    let raw_rows = vec![vec![3.0, 10.0], vec![5.0, 20.0], vec![4.0, 12.0]];
    let standardizer = Standardizer::fit(&raw_rows).unwrap();

    let mut export = model
        .to_instruction_model_info(None, Some(&standardizer))
        .unwrap();
    export.validation_data = Some(
        model
            .generate_validation_data(&raw_rows, Some(&standardizer), &device)
            .unwrap(),
    );

    let inference_model = InstructionModel::new(export).unwrap();
    assert_eq!(inference_model.check_validation_data(TOLERANCE).unwrap(), 3);
}
