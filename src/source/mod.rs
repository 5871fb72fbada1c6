//! Image pair sources: where a new game gets its `(id, url)` list from.

use async_trait::async_trait;

use crate::deck::SourceImage;

#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("could not read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("source returned no images")]
    Empty,
}

#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<SourceImage>, SourceError>;
}

/// CSV with a header row followed by `id,url` records.
#[derive(Debug, Clone)]
pub enum CsvImageSource {
    Http { client: reqwest::Client, url: String },
    File(std::path::PathBuf),
}

impl CsvImageSource {
    /// `http(s)://` locations are fetched over the network, anything else is a local path.
    pub fn from_location(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            CsvImageSource::Http { client: reqwest::Client::new(), url: location.to_string() }
        } else {
            CsvImageSource::File(location.into())
        }
    }
}

#[async_trait]
impl ImageSource for CsvImageSource {
    async fn fetch(&self) -> Result<Vec<SourceImage>, SourceError> {
        let body = match self {
            CsvImageSource::Http { client, url } => {
                client.get(url).send().await?.error_for_status()?.text().await?
            }
            CsvImageSource::File(path) => tokio::fs::read_to_string(path).await?,
        };
        parse_csv(&body)
    }
}

/// Fixed in-memory list.
#[derive(Debug, Clone, Default)]
pub struct StaticImageSource(pub Vec<SourceImage>);

#[async_trait]
impl ImageSource for StaticImageSource {
    async fn fetch(&self) -> Result<Vec<SourceImage>, SourceError> {
        if self.0.is_empty() {
            return Err(SourceError::Empty);
        }
        Ok(self.0.clone())
    }
}

pub fn parse_csv(body: &str) -> Result<Vec<SourceImage>, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let mut images = Vec::new();
    for record in reader.records() {
        let record = record?;
        let (Some(id), Some(url)) = (record.get(0), record.get(1)) else {
            continue;
        };
        if id.is_empty() || url.is_empty() {
            continue;
        }
        images.push(SourceImage { id: id.to_string(), url: url.to_string() });
    }
    if images.is_empty() {
        return Err(SourceError::Empty);
    }
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_skips_header_and_trims() {
        let body = "id,url\n 1 , https://img.test/a.png \n2,https://img.test/b.png\r\n\n";
        let images = parse_csv(body).unwrap();
        assert_eq!(
            images,
            vec![
                SourceImage { id: "1".into(), url: "https://img.test/a.png".into() },
                SourceImage { id: "2".into(), url: "https://img.test/b.png".into() },
            ]
        );
    }

    #[test]
    fn test_parse_csv_ignores_incomplete_rows() {
        let body = "id,url\n1\n2,https://img.test/b.png\n3,\n";
        let images = parse_csv(body).unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].id, "2");
    }

    #[test]
    fn test_parse_csv_header_only_is_empty() {
        assert!(matches!(parse_csv("id,url\n"), Err(SourceError::Empty)));
    }

    #[test]
    fn test_from_location() {
        assert!(matches!(CsvImageSource::from_location("https://x.test/a.csv"), CsvImageSource::Http { .. }));
        assert!(matches!(CsvImageSource::from_location("./data/images.csv"), CsvImageSource::File(_)));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let source = CsvImageSource::File("./does/not/exist.csv".into());
        assert!(matches!(source.fetch().await, Err(SourceError::Io(_))));
    }

    #[tokio::test]
    async fn test_static_source() {
        assert!(matches!(StaticImageSource::default().fetch().await, Err(SourceError::Empty)));
        let one = vec![SourceImage { id: "a".into(), url: "u".into() }];
        assert_eq!(StaticImageSource(one.clone()).fetch().await.unwrap(), one);
    }
}
