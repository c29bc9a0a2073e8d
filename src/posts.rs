use blog_common::{
    posts::{
        self, Navigator, PostDraft, RequestFailure, SubmitMethod, Submitter, Transport, Trigger,
        UserId,
    },
    request::HttpTransport,
};
use clap::{App, Arg, ArgMatches, SubCommand};
use std::{
    fmt, fs,
    io::{self, BufRead, Read},
};

use crate::config::CONFIG;

pub fn command<'a, 'b>() -> App<'a, 'b> {
    SubCommand::with_name("posts")
        .about("Write posts")
        .subcommand(draft_args(SubCommand::with_name("new")).about("Publish a new post"))
        .subcommand(
            draft_args(
                SubCommand::with_name("edit").arg(
                    Arg::with_name("id")
                        .required(true)
                        .takes_value(true)
                        .help("Id of the post to edit"),
                ),
            )
            .about("Replace the title, rubric and content of a post"),
        )
}

fn draft_args<'a, 'b>(cmd: App<'a, 'b>) -> App<'a, 'b> {
    cmd.arg(
        Arg::with_name("title")
            .short("t")
            .long("title")
            .takes_value(true)
            .help("Title of the post, asked for if missing"),
    )
    .arg(
        Arg::with_name("rubric")
            .short("r")
            .long("rubric")
            .takes_value(true)
            .help("Id of the rubric of the post, asked for if missing"),
    )
    .arg(
        Arg::with_name("content")
            .short("c")
            .long("content")
            .takes_value(true)
            .conflicts_with("content-file")
            .help("Body of the post. Read from standard input when neither this nor --content-file is given"),
    )
    .arg(
        Arg::with_name("content-file")
            .short("f")
            .long("content-file")
            .takes_value(true)
            .help("File holding the body of the post"),
    )
    .arg(
        Arg::with_name("user")
            .short("u")
            .long("user")
            .takes_value(true)
            .help("Id of the author. Defaults to BLOG_USER_ID, or the anonymous user"),
    )
}

pub fn run<'a>(args: &ArgMatches<'a>) -> Result<(), Error> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    match args.subcommand() {
        ("new", Some(x)) => save(Trigger::SaveNew, x, &mut input),
        ("edit", Some(x)) => save(Trigger::SaveEdit, x, &mut input),
        _ => {
            println!("Unknown subcommand");
            Ok(())
        }
    }
}

fn save<'a, R: BufRead>(trigger: Trigger, args: &ArgMatches<'a>, input: &mut R) -> Result<(), Error> {
    let method = SubmitMethod::from_trigger(trigger, args.value_of("id").map(String::from))?;
    let draft = read_draft(args, input)?;
    let user = args
        .value_of("user")
        .map(UserId::new)
        .unwrap_or_else(|| CONFIG.user_id.clone());

    let submitter = Submitter::new(
        CONFIG.api_url.as_str(),
        user,
        HttpTransport::new()?,
        Terminal::new(&CONFIG.api_url),
    );
    publish(&submitter, &draft, method)
}

/// Failures past this point were already logged along with the request.
fn publish<T: Transport, N: Navigator>(
    submitter: &Submitter<T, N>,
    draft: &PostDraft,
    method: SubmitMethod,
) -> Result<(), Error> {
    submitter
        .submit(draft, method)
        .map(|_| ())
        .map_err(Error::Rejected)
}

fn read_draft<'a, R: BufRead>(args: &ArgMatches<'a>, input: &mut R) -> Result<PostDraft, Error> {
    let title = match args.value_of("title") {
        Some(title) => title.to_owned(),
        None => crate::ask_for("Title", input)?,
    };
    let rubric_id = match args.value_of("rubric") {
        Some(rubric) => rubric.to_owned(),
        None => crate::ask_for("Rubric", input)?,
    };
    let content = match (args.value_of("content"), args.value_of("content-file")) {
        (Some(content), _) => content.to_owned(),
        (None, Some(path)) => fs::read_to_string(path)?,
        (None, None) => {
            let mut content = String::new();
            input.read_to_string(&mut content)?;
            content
        }
    };
    Ok(PostDraft::new(title, rubric_id, content))
}

/// Shows where the saved post can be read.
struct Terminal {
    base_url: String,
}

impl Terminal {
    fn new(base_url: &str) -> Terminal {
        Terminal {
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    fn url(&self, location: &str) -> String {
        format!("{}{}", self.base_url, location)
    }
}

impl Navigator for Terminal {
    fn navigate(&self, location: &str) {
        println!("{}", self.url(location));
    }
}

#[derive(Debug)]
pub enum Error {
    Io(io::Error),
    Submit(posts::Error),
    /// The API refused the post, or its answer was unusable.
    Rejected(posts::Error),
}

impl Error {
    pub fn is_logged(&self) -> bool {
        matches!(self, Error::Rejected(_))
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}
impl From<posts::Error> for Error {
    fn from(err: posts::Error) -> Self {
        Error::Submit(err)
    }
}
impl From<RequestFailure> for Error {
    fn from(err: RequestFailure) -> Self {
        Error::Submit(posts::Error::Request(err))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "Couldn't read the post: {}", e),
            Error::Submit(e) | Error::Rejected(e) => write!(f, "Couldn't save the post: {}", e),
        }
    }
}
