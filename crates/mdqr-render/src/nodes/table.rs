//! Table node conversions

use markdown::mdast::{AlignKind, Node, Table};

use super::{RenderContext, children_to_html, node_to_html};

/// Convert table node to HTML
///
/// The first row becomes the header.
pub fn table_to_html<'a>(table: &'a Table, ctx: &mut RenderContext<'a>, out: &mut String) {
    out.push_str("<table>\n");

    let mut rows = table.children.iter();
    if let Some(head) = rows.next() {
        out.push_str("<thead>\n");
        row_to_html(head, &table.align, "th", ctx, out);
        out.push_str("</thead>\n");
    }

    let body: Vec<&Node> = rows.collect();
    if !body.is_empty() {
        out.push_str("<tbody>\n");
        for row in body {
            row_to_html(row, &table.align, "td", ctx, out);
        }
        out.push_str("</tbody>\n");
    }

    out.push_str("</table>\n");
}

fn row_to_html<'a>(
    row: &'a Node,
    align: &[AlignKind],
    cell_tag: &str,
    ctx: &mut RenderContext<'a>,
    out: &mut String,
) {
    let Node::TableRow(row) = row else {
        node_to_html(row, ctx, out);
        return;
    };

    out.push_str("<tr>\n");
    for (index, cell) in row.children.iter().enumerate() {
        match align.get(index) {
            Some(AlignKind::Left) => out.push_str(&format!("<{cell_tag} align=\"left\">")),
            Some(AlignKind::Center) => out.push_str(&format!("<{cell_tag} align=\"center\">")),
            Some(AlignKind::Right) => out.push_str(&format!("<{cell_tag} align=\"right\">")),
            _ => out.push_str(&format!("<{cell_tag}>")),
        }
        match cell {
            Node::TableCell(cell) => children_to_html(&cell.children, ctx, out),
            other => node_to_html(other, ctx, out),
        }
        out.push_str(&format!("</{cell_tag}>\n"));
    }
    out.push_str("</tr>\n");
}
