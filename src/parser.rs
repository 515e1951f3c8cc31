//! Reading detection files for the command line

use anyhow::{Context, Result};
use patcheck_core::Detection;
use patcheck_cv::inspection::PatternRequest;
use patcheck_cv::utils::ImageUtils;
use serde::Deserialize;
use std::path::Path;

/// Either a full request or a bare list of detections
#[derive(Deserialize)]
#[serde(untagged)]
enum DetectionsFile {
    Request(PatternRequest),
    Detections(Vec<Detection>),
}

pub fn read_request<P: AsRef<Path>>(path: P) -> Result<PatternRequest> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read detections: {:?}", path))?;

    let file: DetectionsFile = serde_json::from_str(&content)
        .with_context(|| format!("Invalid detections file: {:?}", path))?;

    Ok(match file {
        DetectionsFile::Request(request) => request,
        DetectionsFile::Detections(detections) => PatternRequest {
            coordinates: detections.iter().map(|d| d.bbox.to_vec()).collect(),
            class_ids: detections.iter().map(|d| d.class_id).collect(),
            pattern_key: None,
            pattern: None,
        },
    })
}

/// Rescale the request's pixel boxes to coordinates relative to `image`
pub fn scale_to_image<P: AsRef<Path>>(mut request: PatternRequest, image: P) -> Result<PatternRequest> {
    let detections = Detection::from_parts(&request.coordinates, &request.class_ids)?;
    let relative = ImageUtils::to_relative_for_image(&detections, image)?;

    request.coordinates = relative.iter().map(|d| d.bbox.to_vec()).collect();
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_bare_detections() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("detections.json");
        std::fs::write(&path, r#"[{"class_id": 2, "box": [0.1, 0.2, 0.3, 0.4]}]"#)?;

        let request = read_request(&path)?;
        assert_eq!(request.coordinates, vec![vec![0.1, 0.2, 0.3, 0.4]]);
        assert_eq!(request.class_ids, vec![2]);
        assert!(request.pattern_key.is_none());
        Ok(())
    }

    #[test]
    fn test_read_full_request() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("request.json");
        std::fs::write(
            &path,
            r#"{"coordinates": [[1, 2, 3, 4]], "class_ids": [0], "pattern_key": "rotor"}"#,
        )?;

        let request = read_request(&path)?;
        assert_eq!(request.pattern_key.as_deref(), Some("rotor"));
        assert_eq!(request.coordinates, vec![vec![1.0, 2.0, 3.0, 4.0]]);
        Ok(())
    }
}
