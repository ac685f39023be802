//! Host page: the chart container and its children, plus HTML publishing.

use std::path::Path;
use std::time::Duration;

use crate::models::ChartConfig;
use crate::utils::errors::ChartError;

/// Id of the container every chart surface is appended to
pub const CHART_SECTION_ID: &str = "chartSection";

/// Static message shown when a refresh cycle fails
pub const ERROR_MESSAGE: &str = "Oh No! Something went wrong.";

/// A child of a container
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Loading indicator
    Loader,
    /// Plain paragraph
    Message(String),
    /// Canvas-like element holding one chart
    Surface(Surface),
}

/// A drawn chart, identified by its coin id
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pub id: String,
    pub config: ChartConfig,
    /// Rendered SVG document
    pub svg: String,
}

/// An element that owns an ordered list of children
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    id: String,
    children: Vec<Node>,
}

impl Container {
    pub fn new(id: impl Into<String>) -> Self {
        Container {
            id: id.into(),
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    #[cfg(test)]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Drop every child and put `node` in their place
    pub fn replace_with(&mut self, node: Node) {
        self.children.clear();
        self.children.push(node);
    }

    pub fn clear(&mut self) {
        self.children.clear();
    }

    /// Append as last child
    pub fn append(&mut self, node: Node) {
        self.children.push(node);
    }

    pub fn surfaces(&self) -> impl Iterator<Item = &Surface> {
        self.children.iter().filter_map(|node| match node {
            Node::Surface(surface) => Some(surface),
            _ => None,
        })
    }

    /// Ids of chart surfaces in document order
    pub fn surface_ids(&self) -> Vec<&str> {
        self.surfaces().map(|s| s.id.as_str()).collect()
    }

    #[cfg(test)]
    pub fn has_loader(&self) -> bool {
        self.children.iter().any(|node| matches!(node, Node::Loader))
    }

    fn write_html(&self, out: &mut String) {
        out.push_str(&format!("<div id=\"{}\">\n", escape_html(&self.id)));
        for node in &self.children {
            match node {
                Node::Loader => out.push_str("<div class='loader'></div>\n"),
                Node::Message(text) => {
                    out.push_str(&format!("<p>{}</p>\n", escape_html(text)));
                }
                Node::Surface(surface) => {
                    let config = serde_json::to_string(&surface.config)
                        .unwrap_or_default()
                        .replace("</", "<\\/");
                    out.push_str(&format!(
                        "<figure class=\"chart\" id=\"{}\">\n{}\n<script type=\"application/json\" class=\"chart-config\">{}</script>\n</figure>\n",
                        escape_html(&surface.id),
                        surface.svg,
                        config
                    ));
                }
            }
        }
        out.push_str("</div>\n");
    }
}

/// The document the charts live in
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    title: String,
    reload_after: Option<Duration>,
    containers: Vec<Container>,
}

impl Page {
    /// Page with an empty chart section
    pub fn new() -> Self {
        let mut page = Self::blank();
        page.containers.push(Container::new(CHART_SECTION_ID));
        page
    }

    /// Document without any containers
    pub fn blank() -> Self {
        Page {
            title: "Crypto Prices".to_string(),
            reload_after: None,
            containers: Vec::new(),
        }
    }

    /// Make the published page reload itself every `period`
    pub fn with_reload(mut self, period: Duration) -> Self {
        self.reload_after = Some(period);
        self
    }

    #[cfg(test)]
    pub fn element_by_id(&self, id: &str) -> Option<&Container> {
        self.containers.iter().find(|c| c.id() == id)
    }

    pub fn element_by_id_mut(&mut self, id: &str) -> Option<&mut Container> {
        self.containers.iter_mut().find(|c| c.id() == id)
    }

    /// The chart container, which must exist
    pub fn chart_section_mut(&mut self) -> Result<&mut Container, ChartError> {
        self.element_by_id_mut(CHART_SECTION_ID)
            .ok_or_else(|| ChartError::ContainerMissing(CHART_SECTION_ID.to_string()))
    }

    pub fn to_html(&self) -> String {
        let mut out = String::from("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
        if let Some(period) = self.reload_after {
            out.push_str(&format!(
                "<meta http-equiv=\"refresh\" content=\"{}\">\n",
                period.as_secs().max(1)
            ));
        }
        out.push_str(&format!("<title>{}</title>\n", escape_html(&self.title)));
        out.push_str(STYLE);
        out.push_str("</head>\n<body>\n");
        out.push_str(&format!("<h1>{}</h1>\n", escape_html(&self.title)));
        for container in &self.containers {
            container.write_html(&mut out);
        }
        out.push_str("</body>\n</html>\n");
        out
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

const STYLE: &str = "<style>
.chart svg { width: 100%; height: auto; }
.loader { width: 48px; height: 48px; border: 6px solid #ddd; border-top-color: #3498db; border-radius: 50%; animation: spin 1s linear infinite; }
@keyframes spin { to { transform: rotate(360deg); } }
</style>
";

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Write the page to `path`. The file is replaced atomically so a reader
/// never sees a partial document.
pub async fn publish_page(html: &str, path: &Path) -> Result<(), ChartError> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    tokio::fs::write(&tmp, html).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface(id: &str) -> Node {
        Node::Surface(Surface {
            id: id.to_string(),
            config: ChartConfig::line(&[], &[], "BTC"),
            svg: "<svg></svg>".to_string(),
        })
    }

    #[test]
    fn test_new_page_has_empty_chart_section() {
        let page = Page::new();
        let section = page.element_by_id(CHART_SECTION_ID).unwrap();
        assert!(section.children().is_empty());
        assert!(Page::blank().element_by_id(CHART_SECTION_ID).is_none());
    }

    #[test]
    fn test_replace_with_discards_children() {
        let mut container = Container::new("c");
        container.append(surface("bitcoin"));
        container.append(surface("ethereum"));
        container.replace_with(Node::Loader);

        assert_eq!(container.children(), &[Node::Loader]);
        assert!(container.surface_ids().is_empty());
    }

    #[test]
    fn test_to_html_renders_children() {
        let mut page = Page::new().with_reload(Duration::from_millis(10_000));
        let section = page.chart_section_mut().unwrap();
        section.append(surface("bitcoin"));
        section.append(Node::Message("a < b".to_string()));

        let html = page.to_html();
        assert!(html.contains("<meta http-equiv=\"refresh\" content=\"10\">"));
        assert!(html.contains("<div id=\"chartSection\">"));
        assert!(html.contains("<figure class=\"chart\" id=\"bitcoin\">"));
        assert!(html.contains("\"borderColor\":\"blue\""));
        assert!(html.contains("<p>a &lt; b</p>"));
    }

    #[tokio::test]
    async fn test_publish_page_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("charts.html");

        publish_page("<html>one</html>", &path).await.unwrap();
        publish_page("<html>two</html>", &path).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "<html>two</html>");
        assert!(!dir.path().join("charts.html.tmp").exists());
    }
}
