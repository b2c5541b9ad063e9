// 该文件是 Shiwu （食物识别） 项目的一部分。
// src/input/read_image_file.rs - 图像解码与预处理
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

use std::io::Cursor;

use image::{DynamicImage, ImageError, ImageReader, RgbImage, imageops::FilterType};
use thiserror::Error;
use tracing::{debug, error};

use crate::{
  frame::{FoodTensor, MODEL_INPUT_SIZE},
  input::ImageRef,
};

#[derive(Error, Debug)]
pub enum PreprocessError {
  #[error("图像解码错误: {0}")]
  Decode(#[from] ImageError),
  #[error("图像尺寸无效: {width}x{height}")]
  Resize { width: u32, height: u32 },
}

fn decode(image: &ImageRef) -> Result<DynamicImage, ImageError> {
  match image {
    ImageRef::Path(path) => ImageReader::open(path)
      .and_then(|reader| reader.with_guessed_format())
      .map_err(ImageError::IoError)?
      .decode(),
    ImageRef::Bytes(bytes) => ImageReader::new(Cursor::new(bytes.as_slice()))
      .with_guessed_format()
      .map_err(ImageError::IoError)?
      .decode(),
  }
}

/// 将图像解码、缩放到 224x224 并归一化到 `[0, 1]`
pub fn preprocess(image: &ImageRef) -> Result<FoodTensor, PreprocessError> {
  let decoded = decode(image).inspect_err(|e| error!("图像解码失败 {}: {}", image, e))?;
  resize_to_model(&decoded)
}

fn resize_to_model(decoded: &DynamicImage) -> Result<FoodTensor, PreprocessError> {
  let (width, height) = (decoded.width(), decoded.height());
  debug!("原始图像尺寸: {}x{}", width, height);
  if width == 0 || height == 0 {
    error!("图像尺寸无效: {}x{}", width, height);
    return Err(PreprocessError::Resize { width, height });
  }

  let rgb = decoded
    .resize_exact(MODEL_INPUT_SIZE, MODEL_INPUT_SIZE, FilterType::Triangle)
    .into_rgb8();
  normalize(&rgb)
}

fn normalize(rgb: &RgbImage) -> Result<FoodTensor, PreprocessError> {
  FoodTensor::from_rgb8(rgb.as_raw()).map_err(|e| {
    error!("缩放结果异常: {}", e);
    PreprocessError::Resize {
      width: rgb.width(),
      height: rgb.height(),
    }
  })
}
