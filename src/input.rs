// 该文件是 Shiwu （食物识别） 项目的一部分。
// src/input.rs - 图像引用与预处理
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

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::error;
use url::Url;

use crate::{FromUrl, FromUrlWithScheme};

mod read_image_file;
pub use self::read_image_file::{PreprocessError, preprocess};

/// 相机采集得到的图像引用
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
  Path(PathBuf),
  Bytes(Vec<u8>),
}

#[derive(Error, Debug)]
pub enum InputError {
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
  #[error("路径解码错误: {0}")]
  PathDecode(#[from] std::string::FromUtf8Error),
}

impl FromUrlWithScheme for ImageRef {
  const SCHEME: &'static str = "image";
}

const FILE_SCHEME: &str = "file";

impl FromUrl for ImageRef {
  type Error = InputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME && url.scheme() != FILE_SCHEME {
      error!(
        "URI scheme mismatch: expected '{}' or '{}', found '{}'",
        Self::SCHEME,
        FILE_SCHEME,
        url.scheme()
      );
      return Err(InputError::SchemeMismatch(url.scheme().to_string()));
    }

    let path = urlencoding::decode(url.path())?;
    Ok(ImageRef::Path(PathBuf::from(path.into_owned())))
  }
}

impl From<PathBuf> for ImageRef {
  fn from(path: PathBuf) -> Self {
    ImageRef::Path(path)
  }
}

impl From<&Path> for ImageRef {
  fn from(path: &Path) -> Self {
    ImageRef::Path(path.to_path_buf())
  }
}

impl From<Vec<u8>> for ImageRef {
  fn from(bytes: Vec<u8>) -> Self {
    ImageRef::Bytes(bytes)
  }
}

impl std::fmt::Display for ImageRef {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ImageRef::Path(path) => write!(f, "{}", path.display()),
      ImageRef::Bytes(bytes) => write!(f, "<{} 字节>", bytes.len()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn image_and_file_urls_become_paths() {
    let url = Url::parse("image:///tmp/meal%20photo.jpg").unwrap();
    assert_eq!(
      ImageRef::from_url(&url).unwrap(),
      ImageRef::Path(PathBuf::from("/tmp/meal photo.jpg"))
    );

    let url = Url::parse("file:///tmp/lunch.png").unwrap();
    assert_eq!(
      ImageRef::from_url(&url).unwrap(),
      ImageRef::Path(PathBuf::from("/tmp/lunch.png"))
    );
  }

  #[test]
  fn other_schemes_are_rejected() {
    let url = Url::parse("https://example.com/pizza.jpg").unwrap();
    assert!(matches!(
      ImageRef::from_url(&url),
      Err(InputError::SchemeMismatch(scheme)) if scheme == "https"
    ));
  }
}
