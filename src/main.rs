#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::io::{self, BufRead, Write};
    use std::path::PathBuf;

    use clap::Parser;
    use log::warn;
    use musicquiz::{
        Catalog, CatalogSource, Category, DirectorySource, FilePreferences, Language,
        MemoryPreferences, PreferenceStore, QuestionCount, QuizConfig, QuizEngine, QuizFormat,
        SystemClock, demo_source, language,
    };
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[derive(Parser)]
    #[command(name = "musicquiz")]
    #[command(about = "Play a classical music quiz in the terminal")]
    pub struct Cli {
        #[arg(long, help = "Directory holding music.{lang}.json (built-in demo data if omitted)")]
        pub data_dir: Option<PathBuf>,
        #[arg(long, help = "Catalog language (ja or en); saved for next time")]
        pub lang: Option<Language>,
        #[arg(long, help = "Preference file remembering the language")]
        pub prefs: Option<PathBuf>,
        #[arg(long, help = "Player nickname", default_value_t = String::from("Guest"))]
        pub nickname: String,
        #[arg(long, help = "Question format", default_value_t = QuizFormat::AudioToTitle)]
        pub format: QuizFormat,
        #[arg(long, help = "Composer to quiz on, or \"all\"", default_value_t = Category::All)]
        pub category: Category,
        #[arg(long, help = "Number of questions, or \"all\"", default_value_t = QuestionCount::Limit(5))]
        pub count: QuestionCount,
        #[arg(long, help = "Seed for reproducible question order")]
        pub seed: Option<u64>,
    }

    pub fn run() -> Result<(), Box<dyn std::error::Error>> {
        let cli = Cli::parse();

        let mut prefs: Box<dyn PreferenceStore> = match &cli.prefs {
            Some(path) => Box::new(FilePreferences::open(path)?),
            None => Box::new(MemoryPreferences::new()),
        };
        let source: Box<dyn CatalogSource> = match &cli.data_dir {
            Some(dir) => Box::new(DirectorySource::new(dir)),
            None => Box::new(demo_source()),
        };

        let mut catalog = Catalog::new(language::load_language(&*prefs));
        catalog.load(&*source, false);
        if let Some(lang) = cli.lang {
            catalog.set_language(lang, &mut *prefs, &*source);
        }

        if let Some(error) = catalog.error() {
            return Err(error.clone().into());
        }

        let config = QuizConfig::new(&cli.nickname, cli.format, cli.category, cli.count)?;
        let rng = match cli.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut engine = QuizEngine::new(rng, SystemClock);
        engine.setup_quiz(&catalog, config);

        if engine.session().questions.is_empty() {
            println!("No pieces match category {}.", engine.session().category);
            return Ok(());
        }

        engine.start_quiz();
        play(&mut engine)?;

        let session = engine.session();
        println!();
        println!(
            "{}: {}/{} correct in {:.1}s",
            session.nickname,
            session.correct_count,
            session.questions.len(),
            session.total_time()
        );
        println!("Score: {}", session.final_score());

        if let Some(submission) = engine.score_submission() {
            println!("{}", serde_json::to_string(&submission)?);
        }

        Ok(())
    }

    fn play(engine: &mut QuizEngine<StdRng, SystemClock>) -> io::Result<()> {
        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();
        let mut stdout = io::stdout();

        while !engine.is_complete() {
            let Some(question) = engine.current_question().cloned() else {
                break;
            };
            let number = engine.session().position + 1;
            println!();
            println!("Q{}. {}", number, question.prompt());
            for (index, option) in question.options.iter().enumerate() {
                println!("  {}) {}", index + 1, question.format.option_label(option));
            }

            let selected = loop {
                print!("> ");
                stdout.flush()?;

                let Some(line) = lines.next() else {
                    warn!("input closed before the quiz finished");
                    return Ok(());
                };

                match line?.trim().parse::<usize>() {
                    Ok(choice) if (1..=question.options.len()).contains(&choice) => {
                        break question.options[choice - 1].id.clone();
                    }
                    _ => println!("Enter a number from 1 to {}.", question.options.len()),
                }
            };

            if let Some(record) = engine.answer_question(&selected) {
                if record.is_correct {
                    println!("Correct!");
                } else {
                    println!("Wrong. It was {}.", record.question.correct_answer.display_label());
                }
            }
        }

        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    pretty_env_logger::init();

    if let Err(error) = cli::run() {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}
