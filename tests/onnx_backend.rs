// 该文件是 Shiwu （食物识别） 项目的一部分。
// tests/onnx_backend.rs - ONNX 推理后端测试
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

#![cfg(feature = "model_onnx")]

use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use prost::Message;
use tract_onnx::pb::{
  self, AttributeProto, GraphProto, ModelProto, NodeProto, OperatorSetIdProto, TensorProto,
  TensorShapeProto, TypeProto, ValueInfoProto, attribute_proto::AttributeType,
  tensor_proto::DataType, tensor_shape_proto::dimension, type_proto,
};
use url::Url;

use shiwu::{
  FromUrl,
  catalog::FoodLabel,
  input::{ImageRef, preprocess},
  model::{InferenceContext, OnnxClassifierBuilder, predict},
  recognize::{Recognition, Recognizer, RecognizerConfig},
};

/// 通道均值模型：对 H、W 求平均后乘以 `[3, 28]` 权重，
/// 把 R、G、B 均值分别送到披萨、鱼、苹果三个类别
fn channel_mean_model() -> ModelProto {
  let mut weights = vec![0f32; 3 * FoodLabel::COUNT];
  weights[FoodLabel::Pizza.index()] = 1.0;
  weights[FoodLabel::COUNT + FoodLabel::Fish.index()] = 1.0;
  weights[2 * FoodLabel::COUNT + FoodLabel::Apple.index()] = 1.0;

  let tensor_type = |dims: &[i64]| TypeProto {
    value: Some(type_proto::Value::TensorType(type_proto::Tensor {
      elem_type: DataType::Float as i32,
      shape: Some(TensorShapeProto {
        dim: dims
          .iter()
          .map(|&d| pb::tensor_shape_proto::Dimension {
            value: Some(dimension::Value::DimValue(d)),
            ..Default::default()
          })
          .collect(),
      }),
    })),
    ..Default::default()
  };

  let graph = GraphProto {
    name: "channel_mean".to_string(),
    node: vec![
      NodeProto {
        name: "mean".to_string(),
        op_type: "ReduceMean".to_string(),
        input: vec!["image".to_string()],
        output: vec!["means".to_string()],
        attribute: vec![
          AttributeProto {
            name: "axes".to_string(),
            r#type: AttributeType::Ints as i32,
            ints: vec![1, 2],
            ..Default::default()
          },
          AttributeProto {
            name: "keepdims".to_string(),
            r#type: AttributeType::Int as i32,
            i: 0,
            ..Default::default()
          },
        ],
        ..Default::default()
      },
      NodeProto {
        name: "classify".to_string(),
        op_type: "MatMul".to_string(),
        input: vec!["means".to_string(), "weights".to_string()],
        output: vec!["scores".to_string()],
        ..Default::default()
      },
    ],
    initializer: vec![TensorProto {
      name: "weights".to_string(),
      dims: vec![3, FoodLabel::COUNT as i64],
      data_type: DataType::Float as i32,
      float_data: weights,
      ..Default::default()
    }],
    input: vec![ValueInfoProto {
      name: "image".to_string(),
      r#type: Some(tensor_type(&[1, 224, 224, 3])),
      ..Default::default()
    }],
    output: vec![ValueInfoProto {
      name: "scores".to_string(),
      r#type: Some(tensor_type(&[1, FoodLabel::COUNT as i64])),
      ..Default::default()
    }],
    ..Default::default()
  };

  ModelProto {
    ir_version: 7,
    opset_import: vec![OperatorSetIdProto {
      domain: String::new(),
      version: 13,
    }],
    producer_name: "shiwu-tests".to_string(),
    graph: Some(graph),
    ..Default::default()
  }
}

/// 写入临时目录，文件名按测试区分避免并行冲突
fn write_model(name: &str) -> PathBuf {
  let path = std::env::temp_dir().join(format!("shiwu-{}-{}.onnx", name, std::process::id()));
  std::fs::write(&path, channel_mean_model().encode_to_vec()).unwrap();
  path
}

fn solid_photo() -> ImageRef {
  let image = RgbImage::from_pixel(160, 120, Rgb([230, 180, 150]));
  let mut buf = Vec::new();
  DynamicImage::ImageRgb8(image)
    .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
    .unwrap();
  ImageRef::Bytes(buf)
}

fn recognize_with(builder: OnnxClassifierBuilder) -> Recognition {
  let recognizer = Recognizer::new(
    Arc::new(InferenceContext::new(builder)),
    RecognizerConfig::default(),
  );
  recognizer.recognize_outcome(Some(&solid_photo()))
}

#[test]
fn onnx_model_scores_nhwc_channel_means() {
  let path = write_model("raw");
  let outcome = recognize_with(OnnxClassifierBuilder::new(&path));
  std::fs::remove_file(&path).ok();

  assert!(!outcome.is_simulated(), "outcome: {outcome:?}");
  let items = outcome.into_items();
  let labels: Vec<FoodLabel> = items.iter().map(|i| i.label).collect();
  assert_eq!(labels, vec![FoodLabel::Pizza, FoodLabel::Fish, FoodLabel::Apple]);
  let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
  assert_eq!(names, vec!["Пицца", "Рыба", "Яблоко"]);

  let expected = [230.0 / 255.0, 180.0 / 255.0, 150.0 / 255.0];
  for (item, expected) in items.iter().zip(expected) {
    assert!(
      (item.confidence - expected).abs() < 0.01,
      "{}: {} != {}",
      item.label,
      item.confidence,
      expected
    );
  }
}

#[test]
fn softmax_flag_normalizes_onnx_output() {
  let path = write_model("softmax");
  let url = Url::parse(&format!("onnx://{}?softmax=true", path.display())).unwrap();
  let builder = OnnxClassifierBuilder::from_url(&url).unwrap();
  let outcome = recognize_with(builder);

  let context = InferenceContext::new(OnnxClassifierBuilder::new(&path).softmax(true));
  let handle = context.ensure_model_loaded();
  std::fs::remove_file(&path).ok();

  assert!(!outcome.is_simulated(), "outcome: {outcome:?}");
  let items = outcome.into_items();
  assert_eq!(items[0].label, FoodLabel::Pizza);
  assert!((items[0].confidence - 0.079).abs() < 0.005);
  assert!(items.windows(2).all(|w| w[0].confidence > w[1].confidence));

  let tensor = preprocess(&solid_photo()).unwrap();
  let probs = predict(&handle.unwrap(), tensor).unwrap();
  let sum: f32 = probs.as_slice().iter().sum();
  assert!((sum - 1.0).abs() < 1e-4);
  assert!(probs.as_slice().iter().all(|p| *p > 0.0 && *p < 1.0));
}
