// Bookworm - Personal Library Tracker
// Copyright (C) 2025 Bookworm contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Built-in sample library
//!
//! Written to the store the first time the app starts and no collection blob
//! exists yet. Ids run 0..=15.

use crate::library::book::{parse_date_added, Book, BookId};
use chrono::{DateTime, Utc};

/// Number of books in the sample set
pub const SAMPLE_BOOK_COUNT: usize = 16;

struct SampleBook {
    title: &'static str,
    author: &'static str,
    image_url: &'static str,
    rating: f32,
    date_added: &'static str,
    total_pages: u32,
    pages_read: u32,
    genre: &'static str,
    description: &'static str,
    author_bio: &'static str,
    user_review: &'static str,
}

const ROWLING_BIO: &str = "Joanne Rowling writes under the pen name J.K. Rowling. Her publishers asked for \
initials on the first Harry Potter book, and she took K from her grandmother Kathleen.";

const POTTER_GENRE: &str = "Fantasy, Fiction, Young Adult, Magic, Childrens, Middle Grade";

const SAMPLES: [SampleBook; SAMPLE_BOOK_COUNT] = [
    SampleBook {
        title: "1984",
        author: "George Orwell",
        image_url: "https://m.media-amazon.com/images/I/41sjzA8EGhL._SY445_SX342_.jpg",
        rating: 1.1,
        date_added: "2024-10-01",
        total_pages: 328,
        pages_read: 150,
        genre: "Classics, Fiction, Science Fiction, Dystopia, Literature, Politics",
        description: "Winston Smith works at the Ministry of Truth rewriting history for a Party that \
watches everything, until a forbidden love affair sets him against Big Brother.",
        author_bio: "Eric Arthur Blair, writing as George Orwell, was an English novelist and essayist \
known for Animal Farm and Nineteen Eighty-Four and for his opposition to totalitarianism.",
        user_review: "Intriguing and terrifying in equal measure. The surveillance state feels uncomfortably familiar.",
    },
    SampleBook {
        title: "Brave New World",
        author: "Aldous Huxley",
        image_url: "https://m.media-amazon.com/images/I/416FntWyJQL._SY445_SX342_.jpg",
        rating: 0.9,
        date_added: "2024-10-02",
        total_pages: 311,
        pages_read: 50,
        genre: "Literature, Science Fiction, Novels, School, Audiobook",
        description: "A future World State breeds, conditions and sedates its citizens into contentment, \
and one outsider refuses the bargain.",
        author_bio: "Aldous Leonard Huxley was an English writer and philosopher whose bibliography spans \
nearly fifty books of fiction, essays and poetry.",
        user_review: "Made me think about how much comfort we trade for freedom. Chilling parallels with today.",
    },
    SampleBook {
        title: "To Kill a Mockingbird",
        author: "Harper Lee",
        image_url: "https://m.media-amazon.com/images/I/51IXWZzlgSL._SY445_SX342_.jpg",
        rating: 4.9,
        date_added: "2024-10-03",
        total_pages: 281,
        pages_read: 281,
        genre: "Fiction, Historical Fiction, School, Literature, Young Adult",
        description: "Scout Finch watches her father defend a Black man falsely accused of a crime in a \
small Alabama town divided by prejudice.",
        author_bio: "Nelle Harper Lee was an American novelist whose 1960 novel won the Pulitzer Prize \
and became a classic of modern American literature.",
        user_review: "Atticus Finch is one of my favorite characters in any book. Moving from start to finish.",
    },
    SampleBook {
        title: "The Great Gatsby",
        author: "F. Scott Fitzgerald",
        image_url: "https://m.media-amazon.com/images/I/41k428xb0aL._SY445_SX342_.jpg",
        rating: 4.7,
        date_added: "2024-10-04",
        total_pages: 180,
        pages_read: 180,
        genre: "Fiction, School, Historical Fiction, Romance, Literature, Novels",
        description: "The mysterious Jay Gatsby throws lavish Long Island parties in pursuit of Daisy \
Buchanan during the Jazz Age.",
        author_bio: "Francis Scott Key Fitzgerald was an American novelist and short story writer best \
known for his portraits of the Jazz Age.",
        user_review: "Glamorous and sad. A sharp take on the American Dream in beautiful prose.",
    },
    SampleBook {
        title: "Pride and Prejudice",
        author: "Jane Austen",
        image_url: "https://m.media-amazon.com/images/I/51G7Ie1hExL._SY445_SX342_.jpg",
        rating: 3.0,
        date_added: "2024-03-05",
        total_pages: 279,
        pages_read: 120,
        genre: "Fiction, Historical Fiction, Historical, Literature, Audiobook",
        description: "Elizabeth Bennet trades barbs with the proud Mr. Darcy while her family navigates \
the marriage market of Regency England.",
        author_bio: "Jane Austen was an English novelist whose six novels comment on the landed gentry \
of the late eighteenth century with wit and irony.",
        user_review: "Elizabeth Bennet is the wittiest heroine around. The social comedy still lands.",
    },
    SampleBook {
        title: "The Hobbit",
        author: "J.R.R. Tolkien",
        image_url: "https://m.media-amazon.com/images/I/712cDO7d73L._SY522_.jpg",
        rating: 2.0,
        date_added: "2024-10-06",
        total_pages: 310,
        pages_read: 45,
        genre: "Fantasy, Graphic Novels, Classics, Fiction, Adventure",
        description: "Bilbo Baggins is swept out of his comfortable hole by a wizard and thirteen dwarves \
on a quest to reclaim treasure guarded by a dragon.",
        author_bio: "John Ronald Reuel Tolkien was an English writer and philologist, author of The \
Hobbit and The Lord of the Rings.",
        user_review: "A charming and whimsical adventure through Middle Earth that holds its own.",
    },
    SampleBook {
        title: "Harry Potter and the Sorcerer's Stone",
        author: "J.K. Rowling",
        image_url: "https://m.media-amazon.com/images/I/5152XTq24+L._SY445_SX342_.jpg",
        rating: 5.0,
        date_added: "2024-02-01",
        total_pages: 309,
        pages_read: 309,
        genre: POTTER_GENRE,
        description: "On his eleventh birthday Harry learns he is a wizard with a place at Hogwarts \
School of Witchcraft and Wizardry.",
        author_bio: ROWLING_BIO,
        user_review: "Revisiting this brought back the magic of my childhood.",
    },
    SampleBook {
        title: "Harry Potter and the Chamber of Secrets",
        author: "J.K. Rowling",
        image_url: "https://m.media-amazon.com/images/I/51n-RPrkgSL._SY445_SX342_.jpg",
        rating: 5.0,
        date_added: "2024-10-03",
        total_pages: 341,
        pages_read: 150,
        genre: POTTER_GENRE,
        description: "A warning from a house-elf and a series of attacks at school draw Harry toward a \
hidden chamber.",
        author_bio: ROWLING_BIO,
        user_review: "More mysteries and darker undercurrents. Kept me on the edge of my seat.",
    },
    SampleBook {
        title: "Harry Potter and the Prisoner of Azkaban",
        author: "J.K. Rowling",
        image_url: "https://m.media-amazon.com/images/I/51CLmyCCJnL._SY445_SX342_.jpg",
        rating: 5.0,
        date_added: "2024-09-01",
        total_pages: 435,
        pages_read: 250,
        genre: POTTER_GENRE,
        description: "An escaped prisoner is said to be hunting Harry, and the dementors have come to \
guard Hogwarts.",
        author_bio: ROWLING_BIO,
        user_review: "My favorite of the series. Sirius Black and the dementors made it impossible to put down.",
    },
    SampleBook {
        title: "Harry Potter and the Goblet of Fire",
        author: "J.K. Rowling",
        image_url: "https://m.media-amazon.com/images/I/51vOPzoNd-L._SY445_SX342_.jpg",
        rating: 4.8,
        date_added: "2024-10-01",
        total_pages: 734,
        pages_read: 500,
        genre: POTTER_GENRE,
        description: "Harry is entered into the Triwizard Tournament against his will as Voldemort \
grows stronger.",
        author_bio: ROWLING_BIO,
        user_review: "The Triwizard Tournament was thrilling. Action, emotion and suspense.",
    },
    SampleBook {
        title: "Harry Potter and the Order of the Phoenix",
        author: "J.K. Rowling",
        image_url: "https://m.media-amazon.com/images/I/91TzeItvNFL._SY522_.jpg",
        rating: 4.8,
        date_added: "2024-10-01",
        total_pages: 766,
        pages_read: 300,
        genre: POTTER_GENRE,
        description: "Isolated and disbelieved, Harry starts his fifth year while the Ministry refuses \
to admit Voldemort has returned.",
        author_bio: ROWLING_BIO,
        user_review: "Darker and more frustrating, but incredibly engaging.",
    },
    SampleBook {
        title: "Harry Potter and the Half-Blood Prince",
        author: "J.K. Rowling",
        image_url: "https://m.media-amazon.com/images/I/51uO1pQc5oL._SY445_SX342_.jpg",
        rating: 4.5,
        date_added: "2024-10-11",
        total_pages: 652,
        pages_read: 650,
        genre: POTTER_GENRE,
        description: "Dumbledore takes Harry into Voldemort's past as the war spreads into the \
Muggle world.",
        author_bio: ROWLING_BIO,
        user_review: "Voldemort's backstory was fascinating and the ending tragic.",
    },
    SampleBook {
        title: "Harry Potter and the Deathly Hallows",
        author: "J.K. Rowling",
        image_url: "https://m.media-amazon.com/images/I/51IZtAdNrHL._SY445_SX342_.jpg",
        rating: 4.0,
        date_added: "2024-08-01",
        total_pages: 759,
        pages_read: 200,
        genre: POTTER_GENRE,
        description: "Harry, Ron and Hermione leave Hogwarts behind to hunt the Horcruxes that keep \
Voldemort alive.",
        author_bio: ROWLING_BIO,
        user_review: "A rollercoaster of a conclusion that ties up every loose end.",
    },
    SampleBook {
        title: "Adventures of Huckleberry Finn",
        author: "Mark Twain",
        image_url: "https://m.media-amazon.com/images/I/41sDfHhNnrL._SY445_SX342_.jpg",
        rating: 4.5,
        date_added: "2024-05-01",
        total_pages: 366,
        pages_read: 180,
        genre: "",
        description: "Huck and the runaway Jim travel down the Mississippi on a raft, meeting feuding \
families and con men along the way.",
        author_bio: "Samuel Langhorne Clemens, known as Mark Twain, was an American writer and humorist \
often called the father of American literature.",
        user_review: "A child's-eye view of the river that hides some very deep themes.",
    },
    SampleBook {
        title: "The Fault in Our Stars",
        author: "John Green",
        image_url: "https://m.media-amazon.com/images/I/41YN7Ng8XYL._SY445_SX342_.jpg",
        rating: 2.7,
        date_added: "2024-04-09",
        total_pages: 313,
        pages_read: 100,
        genre: "Young Adult, Fiction, Contemporary, Realistic Fiction, Teen",
        description: "Hazel meets Augustus Waters at a cancer support group and her story is rewritten.",
        author_bio: "John Green is an American author whose novels include Looking for Alaska and Paper \
Towns.",
        user_review: "Heartbreaking yet beautifully written.",
    },
    SampleBook {
        title: "Anna Karenina",
        author: "Leo Tolstoy",
        image_url: "https://m.media-amazon.com/images/I/31lAayxUeAL._SY445_SX342_.jpg",
        rating: 1.0,
        date_added: "2024-10-14",
        total_pages: 864,
        pages_read: 250,
        genre: "Fiction, Romance, Russia, Historical Fiction, Russian Literature",
        description: "Anna leaves her empty marriage for Count Vronsky while Levin searches for meaning \
on his country estate.",
        author_bio: "Lev Nikolayevich Tolstoy was a Russian writer whose War and Peace and Anna \
Karenina are counted among the greatest novels ever written.",
        user_review: "Grand and intimate at once. I couldn't help but empathize with Anna.",
    },
];

fn sample_date(raw: &str) -> DateTime<Utc> {
    parse_date_added(raw).unwrap_or(DateTime::<Utc>::default())
}

/// The fixed sample collection, in id order
pub fn sample_books() -> Vec<Book> {
    SAMPLES
        .iter()
        .enumerate()
        .map(|(index, sample)| Book {
            id: index as BookId,
            title: sample.title.to_string(),
            author: sample.author.to_string(),
            image_url: sample.image_url.to_string(),
            user_rating: sample.rating,
            date_added: sample_date(sample.date_added),
            review: String::new(),
            total_pages: sample.total_pages,
            pages_read: sample.pages_read,
            genre: sample.genre.to_string(),
            description: sample.description.to_string(),
            author_bio: sample.author_bio.to_string(),
            user_review: sample.user_review.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sample_ids_are_sequential() {
        let books = sample_books();
        assert_eq!(books.len(), SAMPLE_BOOK_COUNT);
        for (index, book) in books.iter().enumerate() {
            assert_eq!(book.id as usize, index);
        }
    }

    #[test]
    fn test_sample_dates_parse() {
        for book in sample_books() {
            assert_ne!(book.date_added, DateTime::<Utc>::default(), "{}", book.title);
        }
    }

    #[test]
    fn test_sample_required_fields_present() {
        let titles: HashSet<_> = sample_books().into_iter().map(|b| b.title).collect();
        assert_eq!(titles.len(), SAMPLE_BOOK_COUNT);

        for book in sample_books() {
            assert!(!book.author.is_empty());
            assert!(!book.image_url.is_empty());
            assert!(book.pages_read <= book.total_pages);
        }
    }
}
