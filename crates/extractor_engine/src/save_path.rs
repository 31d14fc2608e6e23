use std::path::{Component, Path, PathBuf};

/// Maps an attachment to the location of its extracted text. Must be pure.
pub trait SavePathDeriver: Send + Sync {
    fn derive(&self, attachment: &str) -> PathBuf;
}

/// Mirrors the attachment's position below `input_root` into `output_root`,
/// swapping the extension for `txt`.
///
/// Attachments outside `input_root` (or when no root is set) keep their whole
/// path under `output_root`. Parent-directory and root components are dropped
/// so the result always stays below `output_root`.
#[derive(Debug, Clone)]
pub struct MirrorTreeDeriver {
    input_root: Option<PathBuf>,
    output_root: PathBuf,
}

impl MirrorTreeDeriver {
    pub fn new(input_root: Option<PathBuf>, output_root: PathBuf) -> Self {
        Self {
            input_root,
            output_root,
        }
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }
}

impl SavePathDeriver for MirrorTreeDeriver {
    fn derive(&self, attachment: &str) -> PathBuf {
        let path = Path::new(attachment);
        let relative = self
            .input_root
            .as_deref()
            .and_then(|root| path.strip_prefix(root).ok())
            .map(normal_components)
            .filter(|rel| rel.file_name().is_some())
            .unwrap_or_else(|| normal_components(path));
        let relative = if relative.file_name().is_some() {
            relative
        } else {
            PathBuf::from("untitled")
        };

        let mut target = self.output_root.join(relative);
        target.set_extension("txt");
        target
    }
}

fn normal_components(path: &Path) -> PathBuf {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_unsafe_components() {
        assert_eq!(
            normal_components(Path::new("../a/./b.pdf")),
            PathBuf::from("a/b.pdf")
        );
    }
}
