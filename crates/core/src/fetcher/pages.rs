//! Auxiliary HTML pages for the seeing and skyprobe directories.

use crate::pipeline::{ArtifactStatus, SourceArtifact};
use crate::session::ObservingDate;

fn file_name(artifact: &SourceArtifact) -> Option<String> {
    artifact
        .local_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

/// `massdimm.html`: links to the fetched data files, inline fetched plots.
pub fn render_massdimm_page(artifacts: &[SourceArtifact]) -> String {
    let mut page = String::from("<html>\n<body>\n<title>Mass/Dimm Data</title>\n");

    let fetched = artifacts
        .iter()
        .filter(|a| a.status == ArtifactStatus::Fetched)
        .filter_map(file_name);

    for name in fetched {
        let href = urlencoding::encode(&name);
        if name.ends_with(".jpg") {
            page.push_str(&format!(
                "<a href=\"./{0}\"><img src=\"{0}\" width=\"750\" title=\"{1}\"></a><p>\n",
                href, name
            ));
        } else {
            page.push_str(&format!("<a href=\"./{}\">{}</a><p>\n", href, name));
        }
    }

    page.push_str("</body>\n</html>\n");
    page
}

/// `skyprobe.html`: the night's sky attenuation image.
pub fn render_skyprobe_page(date: &ObservingDate) -> String {
    format!(
        "<html>\n<body>\n<title>CFHT SkyProbe</title>\n<h1>CFHT SkyProbe for {}</h1>\n\
         <a href=\"./skyprobe.png\"><img src=\"./skyprobe.png\" title=\"skyprobe.png\"></a>\n\
         </body>\n</html>\n",
        date.compact()
    )
}
