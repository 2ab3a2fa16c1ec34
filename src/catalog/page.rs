use std::fmt::Write;

use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};

use super::{
    dto::{CatalogView, ProductCard, ALL_CATEGORIES},
    sort::SortDirective,
};

const STYLE: &str = r#"
body { background: #f4f4f5; font-family: sans-serif; margin: 0 1rem; }
.toolbar { display: flex; background: #fff; margin: .5rem 0; padding: .5rem; }
.toolbar a { color: inherit; text-decoration: none; }
summary { padding: .25rem .5rem; list-style: none; cursor: pointer; }
.menu { position: absolute; z-index: 20; background: #fff; padding: .5rem; list-style: none; box-shadow: 0 2px 6px #0003; }
.menu li { padding: .25rem; }
.grid { display: flex; flex-wrap: wrap; gap: .5rem; }
.card { width: 16rem; height: 20rem; display: flex; flex-direction: column; padding: .5rem; background: #fff; border-radius: .5rem; }
.card img { width: 15rem; height: 15rem; object-fit: contain; }
.card h2 { font-size: 1rem; white-space: nowrap; overflow: hidden; text-overflow: ellipsis; margin: 0; }
.rating { font-size: 1.25rem; margin: 0; background: linear-gradient(90deg, #f59e0b calc(var(--rating) / 5 * 100%), #d4d4d8 0); -webkit-background-clip: text; color: transparent; }
.count { font-size: .75rem; }
.price { display: flex; justify-content: space-between; align-items: center; }
.badge { font-size: .75rem; background: #991b1b; color: #fff; padding: .25rem .5rem; }
"#;

/// Renders the storefront page for a controller snapshot.
pub fn render(view: &CatalogView) -> String {
    let mut html = String::with_capacity(4096 + view.products.len() * 512);
    html.push_str("<!doctype html><html><head><meta charset=\"utf-8\">");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">");
    html.push_str("<title>Storefront</title><style>");
    html.push_str(STYLE);
    html.push_str("</style></head><body>");

    html.push_str("<div class=\"toolbar\">");
    render_category_menu(&mut html, view);
    render_sort_menu(&mut html, view);
    html.push_str("</div><div class=\"grid\">");
    for card in &view.products {
        render_card(&mut html, card);
    }
    html.push_str("</div></body></html>");
    html
}

fn open_attr(open: bool) -> &'static str {
    if open {
        " open"
    } else {
        ""
    }
}

fn render_category_menu(html: &mut String, view: &CatalogView) {
    let _ = write!(
        html,
        "<details{}><summary><a href=\"/menu/categories\">Categories &#x23F7;</a></summary><ul class=\"menu\">",
        open_attr(view.menus.categories_open)
    );
    let _ = write!(
        html,
        "<li><a href=\"/category/{ALL_CATEGORIES}\">All</a></li>"
    );
    for name in &view.categories {
        let _ = write!(
            html,
            "<li><a href=\"/category/{}\">{}</a></li>",
            attr(&urlencoding::encode(name)),
            text(name)
        );
    }
    html.push_str("</ul></details>");
}

fn render_sort_menu(html: &mut String, view: &CatalogView) {
    let _ = write!(
        html,
        "<details{}><summary><a href=\"/menu/sort\">Sort &#x23F7;</a></summary><ul class=\"menu\">",
        open_attr(view.menus.sort_open)
    );
    for d in SortDirective::ALL {
        let _ = write!(
            html,
            "<li><a href=\"/sort/{}/{}\">{}</a></li>",
            d.field.as_str(),
            d.order.as_str(),
            d.label()
        );
    }
    html.push_str("</ul></details>");
}

fn render_card(html: &mut String, card: &ProductCard) {
    let _ = write!(
        html,
        "<div class=\"card\"><img src=\"{}\" alt=\"{}\">\
         <div class=\"price\"><p class=\"rating\" style=\"--rating: {}\">&#9733;&#9733;&#9733;&#9733;&#9733;</p>\
         <p class=\"count\">&nbsp;({})</p></div><h2>{}</h2>",
        attr(&card.image),
        attr(&card.title),
        card.rating,
        card.rating_count,
        text(&card.title)
    );
    match card.discounted_price {
        Some(discounted) if card.has_offer => {
            let _ = write!(
                html,
                "<div class=\"price\"><p><s>${}</s> ${discounted:.2}</p>\
                 <p class=\"badge\">Offer: {}% off</p></div>",
                card.price, card.discount_percent
            );
        }
        _ => {
            let _ = write!(html, "<div><p>${}</p></div>", card.price);
        }
    }
    html.push_str("</div>");
}
