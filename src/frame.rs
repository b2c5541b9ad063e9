// 该文件是 Shiwu （食物识别） 项目的一部分。
// src/frame.rs - NHWC 浮点张量定义
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

use thiserror::Error;

pub const RGB_CHANNELS: usize = 3;

/// 模型输入边长
pub const MODEL_INPUT_SIZE: u32 = 224;

/// 食物识别模型使用的输入张量
pub type FoodTensor = ImageTensor<MODEL_INPUT_SIZE, MODEL_INPUT_SIZE>;

#[derive(Error, Debug)]
#[error("数据长度不匹配: 期望长度 {expected}, 实际长度 {actual}")]
pub struct FrameShapeError {
  pub expected: usize,
  pub actual: usize,
}

/// `[H, W, 3]` 形状、取值在 `[0, 1]` 的归一化图像张量
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor<const W: u32, const H: u32> {
  data: Box<[f32]>,
}

impl<const W: u32, const H: u32> ImageTensor<W, H> {
  pub const LEN: usize = RGB_CHANNELS * W as usize * H as usize;

  pub fn height(&self) -> usize {
    H as usize
  }

  pub fn width(&self) -> usize {
    W as usize
  }

  pub fn channels(&self) -> usize {
    RGB_CHANNELS
  }

  pub fn shape(&self) -> [usize; 3] {
    [H as usize, W as usize, RGB_CHANNELS]
  }

  pub fn as_nhwc(&self) -> &[f32] {
    &self.data
  }

  pub fn into_vec(self) -> Vec<f32> {
    self.data.into_vec()
  }

  /// 从 8 位 RGB 像素（NHWC 排列）构造，每个通道除以 255
  pub fn from_rgb8(pixels: &[u8]) -> Result<Self, FrameShapeError> {
    if pixels.len() != Self::LEN {
      return Err(FrameShapeError {
        expected: Self::LEN,
        actual: pixels.len(),
      });
    }

    let data = pixels
      .iter()
      .map(|&value| f32::from(value) / 255.0)
      .collect::<Vec<_>>();
    Ok(Self {
      data: data.into_boxed_slice(),
    })
  }
}

impl<const W: u32, const H: u32> TryFrom<Vec<f32>> for ImageTensor<W, H> {
  type Error = FrameShapeError;

  fn try_from(data: Vec<f32>) -> Result<Self, Self::Error> {
    if data.len() != Self::LEN {
      return Err(FrameShapeError {
        expected: Self::LEN,
        actual: data.len(),
      });
    }

    Ok(Self {
      data: data.into_boxed_slice(),
    })
  }
}

impl<const W: u32, const H: u32> Default for ImageTensor<W, H> {
  fn default() -> Self {
    let data = vec![0f32; Self::LEN].into_boxed_slice();
    Self { data }
  }
}
