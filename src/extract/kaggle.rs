// ==========================================
// 电商数据集 ETL 管道 - Kaggle 数据集客户端
// ==========================================
// 职责: 通过 Kaggle 公开 API 下载数据集压缩包并就地解包
// 认证: HTTP Basic（凭据可选，公开数据集允许匿名）
// ==========================================

use crate::config::HubConfig;
use crate::error::{EtlError, EtlResult};
use crate::extract::DatasetHub;
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};
use zip::ZipArchive;

/// Kaggle 数据集下载端点
pub const KAGGLE_DOWNLOAD_URL: &str = "https://www.kaggle.com/api/v1/datasets/download";

/// 下载超时（数据集压缩包几十 MB 量级）
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(600);

// ==========================================
// KaggleHub - 生产实现
// ==========================================

pub struct KaggleHub {
    http: reqwest::blocking::Client,
    credentials: Option<(String, String)>,
}

impl KaggleHub {
    /// 创建客户端
    ///
    /// # 参数
    /// - config: 平台凭据（username + key 同时存在才启用认证）
    pub fn new(config: &HubConfig) -> EtlResult<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .build()
            .map_err(|e| EtlError::Internal(format!("HTTP 客户端初始化失败: {}", e)))?;

        let credentials = match (&config.username, &config.key) {
            (Some(user), Some(key)) => Some((user.clone(), key.clone())),
            _ => None,
        };

        Ok(Self { http, credentials })
    }
}

impl DatasetHub for KaggleHub {
    fn download_and_unzip(&self, dataset_slug: &str, dest: &Path) -> EtlResult<()> {
        let url = format!("{}/{}", KAGGLE_DOWNLOAD_URL, dataset_slug);
        info!(url = %url, "请求数据集压缩包");

        let mut request = self.http.get(&url);
        if let Some((user, key)) = &self.credentials {
            request = request.basic_auth(user, Some(key));
        }

        let response = request
            .send()
            .map_err(|e| EtlError::Download(format!("{}: {}", dataset_slug, e)))?
            .error_for_status()
            .map_err(|e| EtlError::Download(format!("{}: {}", dataset_slug, e)))?;

        let bytes = response
            .bytes()
            .map_err(|e| EtlError::Download(format!("{}: 读取响应失败: {}", dataset_slug, e)))?;

        debug!(size = bytes.len(), "压缩包下载完成，开始解包");
        unpack_archive(bytes.as_ref(), dest)
    }
}

/// 解包压缩包到目标目录
///
/// 提取出来便于用内存构造的压缩包做测试。
pub fn unpack_archive(data: &[u8], dest: &Path) -> EtlResult<()> {
    let mut archive = ZipArchive::new(Cursor::new(data))?;
    archive.extract(dest)?;
    info!(files = archive.len(), dir = %dest.display(), "解包完成");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;
    use zip::CompressionMethod;

    fn zip_with_files(files: &[(&str, &str)]) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut writer = zip::ZipWriter::new(Cursor::new(&mut buf));
            let options: FileOptions<'_, ()> =
                FileOptions::default().compression_method(CompressionMethod::Stored);
            for (name, content) in files {
                writer.start_file(*name, options).unwrap();
                writer.write_all(content.as_bytes()).unwrap();
            }
            writer.finish().unwrap();
        }
        buf
    }

    #[test]
    fn test_unpack_archive_writes_entries_into_dest() {
        let dir = tempfile::tempdir().unwrap();
        let data = zip_with_files(&[
            ("olist_orders_dataset.csv", "order_id\no1\n"),
            ("olist_sellers_dataset.csv", "seller_id\ns1\n"),
        ]);

        unpack_archive(&data, dir.path()).unwrap();

        let orders = std::fs::read_to_string(dir.path().join("olist_orders_dataset.csv")).unwrap();
        assert_eq!(orders, "order_id\no1\n");
        assert!(dir.path().join("olist_sellers_dataset.csv").is_file());
    }

    #[test]
    fn test_unpack_archive_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let err = unpack_archive(b"not a zip file", dir.path()).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Acquisition);
    }
}
