//! The navigation bar shown at the top of every signed-in page.

use maud::{Markup, html};

use crate::endpoints;

/// A link in the navigation bar.
///
/// It will change appearance if `is_current` is set to `true`.
#[derive(Clone, Debug, PartialEq)]
struct Link<'a> {
    url: &'a str,
    title: &'a str,
    is_current: bool,
}

impl Link<'_> {
    fn into_desktop_html(self) -> Markup {
        let style = if self.is_current {
            "block py-2 text-blue-700 border-b-2 border-blue-700 \
            dark:text-blue-400 dark:border-blue-400"
        } else {
            "block py-2 text-gray-700 border-b-2 border-transparent \
            hover:text-blue-700 dark:text-gray-300 dark:hover:text-blue-400"
        };

        html!(
            a
                href=(self.url)
                class=(style)
                aria-current=[self.is_current.then_some("page")]
            {
                (self.title)
            }
        )
    }

    fn into_mobile_html(self) -> Markup {
        let style = if self.is_current {
            "block rounded-lg px-3 py-2 bg-blue-50 text-blue-700 \
            dark:bg-blue-900/30 dark:text-blue-200"
        } else {
            "block rounded-lg px-3 py-2 text-gray-700 hover:bg-gray-100 \
            dark:text-gray-200 dark:hover:bg-gray-800"
        };

        // Following a link closes the drawer.
        html!(
            a
                href=(self.url)
                class=(style)
                aria-current=[self.is_current.then_some("page")]
                onclick="this.closest('details').removeAttribute('open')"
            {
                (self.title)
            }
        )
    }
}

/// The navigation bar with a desktop menu and a mobile drawer.
pub struct NavBar<'a> {
    links: Vec<Link<'a>>,
}

impl NavBar<'_> {
    /// Get the navigation bar.
    ///
    /// The link whose URL equals `current_path` exactly is marked as active.
    pub fn new(current_path: &str) -> NavBar<'_> {
        let links = [
            (endpoints::DASHBOARD_VIEW, "Dashboard"),
            (endpoints::TRANSACTIONS_VIEW, "Transactions"),
            (endpoints::MANAGE_VIEW, "Manage"),
        ]
        .into_iter()
        .map(|(url, title)| Link {
            url,
            title,
            is_current: current_path == url,
        })
        .collect();

        NavBar { links }
    }

    /// Render the navigation bar, highlighting the link to the current page.
    pub fn into_html(self) -> Markup {
        let links = self.links;

        html!(
            nav class="bg-white border-b border-gray-200 dark:bg-gray-900 dark:border-gray-700"
            {
                div
                    class="max-w-screen-xl flex items-center justify-between mx-auto px-4 py-3"
                {
                    a
                        href=(endpoints::DASHBOARD_VIEW)
                        class="text-xl font-semibold whitespace-nowrap dark:text-white"
                    {
                        "Budget Tracker"
                    }

                    ul class="hidden md:flex items-center gap-8 font-medium"
                    {
                        @for link in links.iter().cloned() {
                            li { (link.into_desktop_html()) }
                        }

                        li
                        {
                            a
                                href=(endpoints::SIGN_OUT)
                                class="block py-2 text-gray-700 hover:text-blue-700 \
                                dark:text-gray-300 dark:hover:text-blue-400"
                            {
                                "Sign out"
                            }
                        }
                    }

                    details class="relative md:hidden"
                    {
                        summary
                            class="list-none [&::-webkit-details-marker]:hidden cursor-pointer \
                            rounded-lg p-2 text-gray-700 hover:bg-gray-100 \
                            dark:text-gray-200 dark:hover:bg-gray-800"
                            aria-label="Open menu"
                        {
                            "☰"
                        }

                        div
                            class="absolute right-0 z-40 mt-2 w-48 rounded-xl border \
                            border-gray-200 bg-white p-2 shadow-xl \
                            dark:border-gray-700 dark:bg-gray-900"
                        {
                            ul class="flex flex-col gap-1 text-sm font-medium"
                            {
                                @for link in links {
                                    li { (link.into_mobile_html()) }
                                }

                                li
                                {
                                    a
                                        href=(endpoints::SIGN_OUT)
                                        class="block rounded-lg px-3 py-2 text-gray-700 \
                                        hover:bg-gray-100 dark:text-gray-200 dark:hover:bg-gray-800"
                                    {
                                        "Sign out"
                                    }
                                }
                            }
                        }
                    }
                }
            }
        )
    }
}

#[cfg(test)]
mod nav_bar_tests {
    use scraper::{Html, Selector};

    use crate::{endpoints, navigation::NavBar};

    #[test]
    fn marks_exactly_the_current_path_as_active() {
        let cases = [
            (endpoints::DASHBOARD_VIEW, Some(endpoints::DASHBOARD_VIEW)),
            (endpoints::TRANSACTIONS_VIEW, Some(endpoints::TRANSACTIONS_VIEW)),
            (endpoints::MANAGE_VIEW, Some(endpoints::MANAGE_VIEW)),
            (endpoints::ROOT, None),
            ("/dashboard/", None),
            ("/transactions/2025", None),
            (endpoints::TRANSACTIONS_API, None),
            (endpoints::SIGN_OUT, None),
        ];

        for (current_path, want_active) in cases {
            let nav_bar = NavBar::new(current_path);

            let active = nav_bar
                .links
                .iter()
                .filter(|link| link.is_current)
                .map(|link| link.url)
                .collect::<Vec<_>>();

            assert_eq!(
                active,
                want_active.into_iter().collect::<Vec<_>>(),
                "active links for path {current_path:?}"
            );
        }
    }

    #[test]
    fn active_link_is_marked_in_desktop_and_mobile_menus() {
        let markup = NavBar::new(endpoints::MANAGE_VIEW).into_html();

        let html = Html::parse_fragment(&markup.into_string());
        let current = html
            .select(&Selector::parse("a[aria-current=page]").unwrap())
            .map(|link| link.value().attr("href").unwrap_or_default().to_owned())
            .collect::<Vec<_>>();
        assert_eq!(current, vec![endpoints::MANAGE_VIEW, endpoints::MANAGE_VIEW]);
    }

    #[test]
    fn mobile_links_close_the_drawer() {
        let markup = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();

        let html = Html::parse_fragment(&markup.into_string());
        let drawer_links = html
            .select(&Selector::parse("details a[href]").unwrap())
            .filter(|link| link.value().attr("href") != Some(endpoints::SIGN_OUT))
            .collect::<Vec<_>>();

        assert_eq!(drawer_links.len(), 3);
        for link in drawer_links {
            assert!(
                link.value()
                    .attr("onclick")
                    .is_some_and(|onclick| onclick.contains("removeAttribute('open')")),
                "drawer link {:?} should close the drawer",
                link.value().attr("href")
            );
        }
    }
}
