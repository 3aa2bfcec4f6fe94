//! Inline keyboards for reply menus.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::commands::{Intent, Menu};

/// Renders a menu for `owner`, `None` when the reply carries no keyboard.
#[must_use]
pub fn render(menu: &Menu, owner: u64) -> Option<InlineKeyboardMarkup> {
    let button = |label: &str, intent: Intent| {
        InlineKeyboardButton::callback(label.to_owned(), intent.callback_data(owner))
    };

    let rows = match menu {
        Menu::None => return None,
        Menu::Main => vec![
            vec![
                button("📦 Open case", Intent::OpenCase),
                button("👤 Profile", Intent::Profile),
            ],
            vec![
                button("🏎 Garage", Intent::Garage { page: 0 }),
                button("📚 Collection", Intent::Collection),
            ],
            vec![button("🛒 Shop", Intent::Shop)],
        ],
        Menu::Garage {
            cars,
            page,
            total_pages,
        } => {
            let mut rows: Vec<Vec<InlineKeyboardButton>> = cars
                .iter()
                .map(|car| vec![button(&car.label, Intent::ViewItem(car.index))])
                .collect();

            if *total_pages > 1 {
                let mut nav = Vec::with_capacity(3);
                if *page > 0 {
                    nav.push(button("◀️", Intent::Garage { page: page - 1 }));
                }
                nav.push(button(
                    &format!("{}/{}", page + 1, total_pages),
                    Intent::Noop,
                ));
                if page + 1 < *total_pages {
                    nav.push(button("▶️", Intent::Garage { page: page + 1 }));
                }
                rows.push(nav);
            }

            rows.push(vec![button("⬅️ Menu", Intent::Menu)]);
            rows
        }
        Menu::Car { index } => vec![
            vec![button("💸 Sell", Intent::SellItem(*index))],
            vec![button("⬅️ Garage", Intent::Garage { page: 0 })],
        ],
        Menu::Shop { has_tokens } => {
            let mut rows = vec![vec![button("🛒 Buy case", Intent::BuyCase)]];
            if *has_tokens {
                rows.push(vec![button("🎟 Open token", Intent::OpenToken)]);
            }
            rows.push(vec![button("⬅️ Menu", Intent::Menu)]);
            rows
        }
        Menu::BackToGarage => vec![vec![button("⬅️ Garage", Intent::Garage { page: 0 })]],
        Menu::BackToMain => vec![vec![button("⬅️ Menu", Intent::Menu)]],
    };

    Some(InlineKeyboardMarkup::new(rows))
}

#[cfg(test)]
mod tests {
    use teloxide::types::InlineKeyboardButtonKind;

    use super::*;
    use crate::commands::CarButton;

    fn callbacks(markup: &InlineKeyboardMarkup) -> Vec<Vec<String>> {
        markup
            .inline_keyboard
            .iter()
            .map(|row| {
                row.iter()
                    .map(|b| match &b.kind {
                        InlineKeyboardButtonKind::CallbackData(data) => data.clone(),
                        other => panic!("unexpected button kind {other:?}"),
                    })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_no_menu() {
        assert!(render(&Menu::None, 1).is_none());
    }

    #[test]
    fn test_main_menu_is_owned() {
        let markup = render(&Menu::Main, 42).unwrap();
        let data = callbacks(&markup);
        assert_eq!(data[0], vec!["open:42", "profile:42"]);
        assert!(data.iter().flatten().all(|d| d.contains(":42")));
    }

    #[test]
    fn test_garage_navigation_middle_page() {
        let menu = Menu::Garage {
            cars: vec![CarButton {
                index: 3,
                label: "🔵 Audi R8".to_owned(),
            }],
            page: 1,
            total_pages: 3,
        };
        let data = callbacks(&render(&menu, 7).unwrap());

        assert_eq!(data[0], vec!["car:7:3"]);
        assert_eq!(data[1], vec!["garage:7:0", "noop:7", "garage:7:2"]);
        assert_eq!(data[2], vec!["menu:7"]);
    }

    #[test]
    fn test_garage_single_page_has_no_navigation() {
        let menu = Menu::Garage {
            cars: vec![],
            page: 0,
            total_pages: 1,
        };
        let data = callbacks(&render(&menu, 7).unwrap());
        assert_eq!(data, vec![vec!["menu:7".to_owned()]]);
    }

    #[test]
    fn test_shop_token_button() {
        let without = callbacks(&render(&Menu::Shop { has_tokens: false }, 1).unwrap());
        assert_eq!(without.len(), 2);

        let with = callbacks(&render(&Menu::Shop { has_tokens: true }, 1).unwrap());
        assert_eq!(with[1], vec!["token:1"]);
    }
}
