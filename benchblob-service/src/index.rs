//! The browsable index artifacts written after a complete run.

use std::path::Path;

use crate::error::GeneratorError;
use crate::sizes::TargetFile;

/// File name of the HTML index inside the output directory.
pub const INDEX_FILE: &str = "index.html";

/// File name of the plain-text manifest inside the output directory.
pub const MANIFEST_FILE: &str = "manifest.txt";

/// Renders the static HTML index: one row per file with a download link and
/// the formatted size.
pub fn render_html(title: &str, targets: &[TargetFile]) -> String {
    let mut rows = String::new();
    for target in targets {
        let name = target.file_name();
        rows.push_str(&format!(
            "    <tr><td><a href=\"{name}\">{name}</a></td><td>{}</td></tr>\n",
            target.display_size()
        ));
    }

    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
         <body>\n\
         <h1>{title}</h1>\n\
         <table>\n\
         \x20   <tr><th>file</th><th>size</th></tr>\n\
         {rows}\
         </table>\n\
         </body>\n\
         </html>\n"
    )
}

/// Renders the manifest: `name <TAB> bytes <TAB> formatted size` per line.
pub fn render_manifest(targets: &[TargetFile]) -> String {
    let mut out = String::new();
    for target in targets {
        out.push_str(&format!(
            "{}\t{}\t{}\n",
            target.file_name(),
            target.bytes(),
            target.display_size()
        ));
    }
    out
}

/// Writes both index artifacts into the output directory.
pub async fn write_index(
    dir: &Path,
    title: &str,
    targets: &[TargetFile],
) -> Result<(), GeneratorError> {
    tokio::fs::write(dir.join(INDEX_FILE), render_html(title, targets)).await?;
    tokio::fs::write(dir.join(MANIFEST_FILE), render_manifest(targets)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use bytesize::ByteSize;

    use crate::sizes::ladder;

    use super::*;

    #[test]
    fn html_links_every_file() {
        let targets = ladder(&[ByteSize::mib(1), ByteSize::gib(10)]).unwrap();
        let html = render_html("test files", &targets);

        assert!(html.contains("<title>test files</title>"));
        assert!(html.contains("<a href=\"1MiB.bin\">1MiB.bin</a>"));
        assert!(html.contains("<a href=\"10GiB.bin\">10GiB.bin</a>"));
        assert!(html.contains("<td>10 GiB</td>"));
    }

    #[test]
    fn manifest_has_one_line_per_file() {
        let targets = ladder(&[ByteSize::mib(1), ByteSize::mib(10)]).unwrap();
        let manifest = render_manifest(&targets);

        let lines: Vec<_> = manifest.lines().collect();
        assert_eq!(lines, ["1MiB.bin\t1048576\t1 MiB", "10MiB.bin\t10485760\t10 MiB"]);
    }

    #[tokio::test]
    async fn write_index_creates_both_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let targets = ladder(&[ByteSize::mib(1)]).unwrap();

        write_index(dir.path(), "files", &targets).await.unwrap();

        assert!(dir.path().join(INDEX_FILE).exists());
        assert!(dir.path().join(MANIFEST_FILE).exists());
    }
}
