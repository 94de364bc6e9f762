use rand::Rng;
use rand::seq::IndexedRandom;

/// Word lists synthetic names are assembled from.
#[derive(Debug, Clone, Copy)]
pub struct Lexicon {
    pub first_names: &'static [&'static str],
    pub last_names: &'static [&'static str],
    pub company_suffixes: &'static [&'static str],
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            first_names: FIRST_NAMES,
            last_names: LAST_NAMES,
            company_suffixes: COMPANY_SUFFIXES,
        }
    }
}

impl Lexicon {
    fn first<R: Rng + ?Sized>(&self, rng: &mut R) -> &'static str {
        self.first_names.choose(rng).copied().unwrap_or("anon")
    }

    fn last<R: Rng + ?Sized>(&self, rng: &mut R) -> &'static str {
        self.last_names.choose(rng).copied().unwrap_or("anon")
    }

    /// A username candidate. Each `level` appends two more random digits.
    pub fn username<R: Rng + ?Sized>(&self, rng: &mut R, level: u32) -> String {
        let first = self.first(rng).to_lowercase();
        let last = self.last(rng).to_lowercase();
        let mut name = match rng.random_range(0..5) {
            0 => format!("{first}.{last}"),
            1 => format!("{last}.{first}"),
            2 => format!("{first}{last}"),
            3 => format!("{}{last}", first.chars().next().unwrap_or('x')),
            _ => format!("{first}_{last}"),
        };
        for _ in 0..level * 2 {
            name.push(char::from(b'0' + rng.random_range(0..10u8)));
        }
        name
    }

    pub fn full_name<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        format!("{} {}", self.first(rng), self.last(rng))
    }

    pub fn company<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        match rng.random_range(0..3) {
            0 => format!("{}-{}", self.last(rng), self.last(rng)),
            1 => format!(
                "{}, {} and {}",
                self.last(rng),
                self.last(rng),
                self.last(rng)
            ),
            _ => format!(
                "{} {}",
                self.last(rng),
                self.company_suffixes.choose(rng).copied().unwrap_or("Ltd")
            ),
        }
    }
}

const FIRST_NAMES: &[&str] = &[
    "Aaliyah", "Abel", "Ada", "Adrian", "Agnes", "Alba", "Albert", "Alma", "Amos", "Anika",
    "Arlo", "Astrid", "August", "Beatrix", "Bennett", "Bianca", "Boris", "Bruno", "Camille",
    "Carmen", "Casper", "Cecil", "Clara", "Cormac", "Dalia", "Dario", "Delia", "Dmitri", "Edda",
    "Elias", "Elif", "Emeric", "Esme", "Ezra", "Farah", "Felix", "Freya", "Gideon", "Greta",
    "Hana", "Hector", "Ilse", "Imani", "Ivo", "Jasper", "Juno", "Kai", "Kenji", "Lara", "Leon",
    "Lior", "Maeve", "Malik", "Mira", "Nadia", "Nico", "Noor", "Odile", "Otto", "Petra",
    "Quentin", "Rafael", "Rhea", "Rosa", "Sami", "Selma", "Soren", "Talia", "Teodor", "Uma",
    "Vera", "Wren", "Xavier", "Yara", "Yusuf", "Zelda", "Zeno",
];

const LAST_NAMES: &[&str] = &[
    "Abara", "Achterberg", "Aldana", "Baptiste", "Barros", "Becker", "Bergstrom", "Bianchi",
    "Brandt", "Castell", "Chandra", "Costa", "Dahl", "Delacroix", "Dorsey", "Duarte", "Eklund",
    "Engel", "Farrow", "Fischer", "Fontaine", "Galloway", "Garza", "Hale", "Halvorsen",
    "Hartley", "Ibarra", "Ishikawa", "Jansen", "Jovanovic", "Kaplan", "Keller", "Kowalski",
    "Lambert", "Lindqvist", "Lorenz", "Maddox", "Marchetti", "Moreau", "Nakamura", "Novak",
    "Okafor", "Olsen", "Ortega", "Pacheco", "Petrov", "Quinlan", "Ramos", "Reyes", "Rossi",
    "Sandoval", "Schultz", "Sorensen", "Tanaka", "Thorne", "Ueda", "Valdez", "Varga", "Weber",
    "Whitaker", "Yilmaz", "Zamora", "Zeller",
];

const COMPANY_SUFFIXES: &[&str] = &["Ltd", "Inc", "Group", "PLC", "LLC", "and Sons"];
