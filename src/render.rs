// Book marketplace client for EVM smart contracts
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not use this file except
// in compliance with the License. You may obtain a copy of the License at
//
//        http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software distributed under the License
// is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express
// or implied. See the License for the specific language governing permissions and limitations under
// the License.

//! Presentation of the listing snapshot.
//!
//! Cards are rendered as an HTML fragment carrying the same control hooks as the storefront page
//! (`del`, `read` and `buyBtn` controls with book indexes in data attributes); a plain-text table
//! is provided for terminals.

use std::fmt::Write;

use alloy_primitives::{keccak256, Address};

use crate::Book;

/// Token symbol shown next to prices.
pub const TOKEN_SYMBOL: &str = "cUSD";

const IDENTICON_CELLS: usize = 8;
const IDENTICON_SCALE: usize = 6;

pub fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Link to the address page of a block explorer.
pub fn explorer_link(explorer: &str, address: Address) -> String {
    format!("{}/address/{address}/transactions", explorer.trim_end_matches('/'))
}

/// Deterministic 8x8 mirrored SVG avatar for an address.
pub fn identicon(address: Address) -> String {
    let hash = keccak256(address);
    let hue = u16::from_be_bytes([hash[0], hash[1]]) % 360;
    let size = IDENTICON_CELLS * IDENTICON_SCALE;

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}" viewBox="0 0 {size} {size}" class="rounded-circle">"#
    );
    let _ = write!(svg, r#"<rect width="{size}" height="{size}" fill="hsl({hue},20%,92%)"/>"#);
    let half = IDENTICON_CELLS / 2;
    for row in 0..IDENTICON_CELLS {
        for col in 0..half {
            let cell = row * half + col;
            if (hash[2 + cell / 8] >> (cell % 8)) & 1 == 0 {
                continue;
            }
            for x in [col, IDENTICON_CELLS - 1 - col] {
                let _ = write!(
                    svg,
                    r#"<rect x="{}" y="{}" width="{IDENTICON_SCALE}" height="{IDENTICON_SCALE}" fill="hsl({hue},55%,45%)"/>"#,
                    x * IDENTICON_SCALE,
                    row * IDENTICON_SCALE,
                );
            }
        }
    }
    svg.push_str("</svg>");
    svg
}

/// Renders a single book card. The delete control is only present when `viewer` owns the book.
pub fn card(book: &Book, viewer: Option<Address>, explorer: &str) -> String {
    let index = book.index;
    let title = escape_html(&book.title);
    let author = escape_html(&book.author);
    let image = escape_html(&book.image);

    let mut html = String::new();
    html.push_str(r#"<div class="col-md-4"><div class="card mb-4">"#);
    let _ = write!(html, r#"<img class="card-img-top" src="{image}" alt="{title}">"#);
    let _ = write!(
        html,
        r#"<div class="position-absolute top-0 end-0 bg-warning mt-4 px-2 py-1 rounded-start">{} Sold</div>"#,
        book.sold
    );
    if viewer.is_some_and(|viewer| book.is_owned_by(viewer)) {
        let _ = write!(
            html,
            r#"<button type="button" class="btn btn-outline-danger del" data-index="{index}">Delete</button>"#
        );
    }
    html.push_str(r#"<div class="card-body text-left p-4 position-relative">"#);
    let _ = write!(
        html,
        r#"<div class="translate-middle-y position-absolute top-0"><a href="{}" target="_blank">{}</a></div>"#,
        escape_html(&explorer_link(explorer, book.owner)),
        identicon(book.owner)
    );
    let _ = write!(html, r#"<h2 class="card-title fs-4 fw-bold mt-2">{title}</h2>"#);
    let _ = write!(html, r#"<p class="card-text mb-4">By {author}</p>"#);
    let _ = write!(
        html,
        r#"<p class="card-text mt-4"><i class="bi bi-book"></i> I have <span class="read-status">{}</span> this Book</p>"#,
        book.read_status()
    );
    let _ = write!(
        html,
        r#"<div class="d-grid gap-2 mb-2"><a class="btn btn-sm btn-outline-secondary read" data-id="{index}">Toggle Read Status</a></div>"#
    );
    let _ = write!(
        html,
        r#"<div class="d-grid gap-2"><a class="btn btn-lg btn-outline-dark buyBtn fs-6 p-3" id="{index}">Buy for {} {TOKEN_SYMBOL}</a></div>"#,
        book.price
    );
    html.push_str("</div></div></div>");
    html
}

/// Renders the whole listing as card fragments, in contract order.
pub fn cards(books: &[Book], viewer: Option<Address>, explorer: &str) -> String {
    books
        .iter()
        .map(|book| card(book, viewer, explorer))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Standalone HTML document containing the listing and the balance of the viewer.
pub fn page(books: &[Book], viewer: Option<Address>, balance: Option<&str>, explorer: &str) -> String {
    let mut html = String::from(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>Book \
         Library</title>\n<link rel=\"stylesheet\" \
         href=\"https://cdn.jsdelivr.net/npm/bootstrap@5.1.3/dist/css/bootstrap.min.css\">\n</\
         head>\n<body>\n<div class=\"container mt-4\">\n",
    );
    if let Some(balance) = balance {
        let _ = writeln!(
            html,
            r#"<span class="badge bg-light text-dark border rounded-pill"><span id="balance">{}</span> {TOKEN_SYMBOL}</span>"#,
            escape_html(balance)
        );
    }
    let _ = writeln!(html, r#"<div class="row" id="marketplace">"#);
    html.push_str(&cards(books, viewer, explorer));
    html.push_str("\n</div>\n</div>\n</body>\n</html>\n");
    html
}

/// Plain-text listing for terminals.
pub fn table(books: &[Book], viewer: Option<Address>) -> String {
    let mut out = format!(
        "{:>5}  {:<32}  {:<24}  {:>12}  {:>6}  {:<8}  {}\n",
        "#", "Title", "Author", "Price", "Sold", "Status", "Owner"
    );
    for book in books {
        let owner = if viewer.is_some_and(|viewer| book.is_owned_by(viewer)) {
            s!("you")
        } else {
            book.owner.to_string()
        };
        let _ = writeln!(
            out,
            "{:>5}  {:<32}  {:<24}  {:>12}  {:>6}  {:<8}  {}",
            book.index.to_string(),
            clip(&book.title, 32),
            clip(&book.author, 24),
            format!("{} {TOKEN_SYMBOL}", book.price),
            book.sold,
            book.read_status(),
            owner
        );
    }
    out
}

fn clip(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_owned();
    }
    let mut clipped = s.chars().take(width - 1).collect::<String>();
    clipped.push('…');
    clipped
}
