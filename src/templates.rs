use axum::http::StatusCode;
use maud::{DOCTYPE, Markup, html};

use crate::{entities::movie, models::Candidate};

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

const INPUT_CLASS: &str = "mt-2 w-full rounded-md border border-gray-300 px-3 py-2 focus:border-blue-500 focus:outline-none focus:ring-1 focus:ring-blue-500";
const BUTTON_CLASS: &str =
    "w-full rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700";

/// `movies` is rendered in the order given.
pub fn list_page(movies: &[movie::Model]) -> String {
    page(
        "My Top Movies",
        html! {
            div class="max-w-5xl mx-auto px-6 py-12" {
                div class="flex items-start justify-between gap-6" {
                    div {
                        h1 class="text-3xl font-bold text-gray-900" { "My Top Movies" }
                        p class="mt-2 text-gray-600" { "These are my all-time favourite movies." }
                    }
                    a class="rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700" href="/add" { "Add Movie" }
                }

                @if movies.is_empty() {
                    div class="mt-10 bg-white shadow rounded-lg p-8" {
                        p class="text-gray-600" { "Nothing here yet. Search for a movie to get started." }
                    }
                } @else {
                    div class="mt-10 grid gap-6 md:grid-cols-2" {
                        @for movie in movies {
                            (movie_card(movie))
                        }
                    }
                }
            }
        },
    )
}

pub fn add_page(error: Option<&str>) -> String {
    page(
        "Add Movie",
        narrow(html! {
            h1 class="text-3xl font-bold text-gray-900" { "Add a Movie" }
            (error_banner(error))
            form class="mt-8 space-y-6" method="post" action="/add" {
                div {
                    label class="block text-sm font-medium text-gray-700" for="movie_name" { "Movie Title" }
                    input class=(INPUT_CLASS) name="movie_name" id="movie_name" required;
                }
                button class=(BUTTON_CLASS) type="submit" { "Search Movie" }
            }
        }),
    )
}

pub fn select_page(query: &str, candidates: &[Candidate]) -> String {
    page(
        "Select Movie",
        narrow(html! {
            h1 class="text-3xl font-bold text-gray-900" { "Select Movie" }
            p class="mt-2 text-gray-600" { "Results for \"" (query) "\"" }

            @if candidates.is_empty() {
                p class="mt-8 text-gray-600" { "No movies matched." }
            } @else {
                ul class="mt-8 divide-y divide-gray-200" {
                    @for candidate in candidates {
                        li class="py-3" {
                            @if let Some(poster) = &candidate.poster_path {
                                a class="text-blue-600 hover:text-blue-800" href=(find_url(candidate.external_id, poster)) {
                                    (candidate.title) " - " (candidate.year)
                                }
                            } @else {
                                span class="text-gray-400" title="No poster available" {
                                    (candidate.title) " - " (candidate.year)
                                }
                            }
                        }
                    }
                }
            }
            a class="mt-8 inline-block text-sm text-blue-600 hover:text-blue-800" href="/add" { "New search" }
        }),
    )
}

pub fn edit_page(movie: &movie::Model, error: Option<&str>) -> String {
    page(
        "Edit Movie",
        narrow(html! {
            h1 class="text-3xl font-bold text-gray-900" { (movie.title) }
            p class="mt-2 text-gray-600" { "Edit Movie Rating" }
            (error_banner(error))
            form class="mt-8 space-y-6" method="post" action=(format!("/edit?id={}", movie.id)) {
                div {
                    label class="block text-sm font-medium text-gray-700" for="rating" { "Your rating out of 10" }
                    input class=(INPUT_CLASS) name="rating" id="rating" value=(movie.rating) required;
                }
                div {
                    label class="block text-sm font-medium text-gray-700" for="review" { "Your review" }
                    input class=(INPUT_CLASS) name="review" id="review" value=(movie.review) maxlength="250" required;
                }
                button class=(BUTTON_CLASS) type="submit" { "Done" }
            }
        }),
    )
}

pub fn error_page(status: StatusCode, message: String) -> String {
    page(
        "Error",
        html! {
            div class="min-h-screen bg-gray-50 flex items-center justify-center" {
                div class="max-w-xl w-full px-6" {
                    div class="bg-white shadow rounded-lg p-8" {
                        h1 class="text-2xl font-bold text-gray-900" { "Error " (status.as_u16()) }
                        p class="mt-4 text-gray-700" { (message) }
                        a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/" { "Back" }
                    }
                }
            }
        },
    )
}

fn page(title: &str, body: Markup) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                script src=(TAILWIND_CDN) {}
            }
            body class="bg-gray-50" { (body) }
        }
    }
    .into_string()
}

fn narrow(inner: Markup) -> Markup {
    html! {
        div class="max-w-2xl mx-auto px-6 py-12" {
            div class="bg-white shadow rounded-lg p-8" { (inner) }
        }
    }
}

fn error_banner(error: Option<&str>) -> Markup {
    html! {
        @if let Some(error) = error {
            p class="mt-4 rounded-md bg-red-50 px-4 py-2 text-sm text-red-700" { (error) }
        }
    }
}

fn movie_card(movie: &movie::Model) -> Markup {
    html! {
        div class="bg-white shadow rounded-lg overflow-hidden flex" {
            img class="w-32 object-cover" src=(movie.img_url) alt=(movie.title);
            div class="p-6 flex-1" {
                p class="text-4xl font-bold text-gray-300" { (movie.ranking) }
                h2 class="mt-2 text-xl font-semibold text-gray-900" {
                    (movie.title)
                    span class="ml-2 font-normal text-gray-500" { "(" (movie.year) ")" }
                }
                p class="mt-1 text-sm font-medium text-yellow-600" { (format!("{:.1}", movie.rating)) " / 10" }
                p class="mt-2 text-sm italic text-gray-700" { "\"" (movie.review) "\"" }
                @if let Some(description) = &movie.description {
                    p class="mt-2 text-sm text-gray-600" { (description) }
                }
                div class="mt-4 flex gap-4 text-sm" {
                    a class="text-blue-600 hover:text-blue-800" href=(format!("/edit?id={}", movie.id)) { "Update" }
                    a class="text-red-600 hover:text-red-800" href=(format!("/delete?id={}", movie.id)) { "Delete" }
                }
            }
        }
    }
}

fn find_url(external_id: i32, poster: &str) -> String {
    format!("/find?id={}&poster={}", external_id, urlencoding::encode(poster))
}
