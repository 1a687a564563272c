use clap::{arg, crate_version, ArgAction, Command};
use lexitrie::suffix_tree::SuffixTree;
use lexitrie::trie::{RbTst, SearchResult};
use std::path::Path;

const RCH: &str = "unreachable was reached";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let long_help = "Examples:
---------
Exact lookup:      `lexitrie search -p \"caf\\u{e9}=a coffee shop\" -k \"cafe\\u{0301}\"`
Prefix lookup:     `lexitrie prefix -p \"thu+ nghie+m=experiment\" -p \"thu+=placeholder\" -k \"thu\"`
Substring search:  `lexitrie find -p \"caf\\u{e9}=a coffee shop\" -k \"offe\"`
Persist and reload: `lexitrie find -p \"caf\\u{e9}=a coffee shop\" -k \"offe\" -o my_index
                     lexitrie find -i my_index -k \"offe\"`";

    let pair_arg = arg!(-p --pair <"KEY=VALUE"> "a key=value pair to insert; repeatable")
        .action(ArgAction::Append)
        .required(false);
    let key_arg = arg!(-k --key <KEY> "query key").required(true);
    let save_arg = arg!(-o --save <PATH> "directory to persist the substring index into").required(false);
    let load_arg = arg!(-i --load <PATH> "directory to reload a persisted substring index from").required(false);

    let mut main_cmd = Command::new("lexitrie")
        .about("Unicode-aware dictionary index: exact/prefix lookup plus substring search")
        .after_long_help(long_help)
        .version(crate_version!());
    main_cmd = main_cmd.subcommand(
        Command::new("search")
            .arg(pair_arg.clone())
            .arg(key_arg.clone())
            .about("exact key lookup against pairs given on the command line"),
    );
    main_cmd = main_cmd.subcommand(
        Command::new("prefix")
            .arg(pair_arg.clone())
            .arg(key_arg.clone())
            .about("list every given key sharing this prefix"),
    );
    main_cmd = main_cmd.subcommand(
        Command::new("find")
            .arg(pair_arg.clone())
            .arg(key_arg.clone())
            .arg(save_arg)
            .arg(load_arg)
            .about("substring search over values' keys, with optional persistence"),
    );

    let matches = main_cmd.get_matches();

    if let Some(cmd) = matches.subcommand_matches("search") {
        let key = cmd.get_one::<String>("key").expect(RCH);
        let trie = build_trie(cmd.get_many::<String>("pair"));
        match trie.search(key.as_bytes()) {
            SearchResult::Found(v) => println!("{v}"),
            SearchResult::NotFound => println!("not found"),
            SearchResult::Invalid => println!("invalid key"),
        }
    }

    if let Some(cmd) = matches.subcommand_matches("prefix") {
        let key = cmd.get_one::<String>("key").expect(RCH);
        let trie = build_trie(cmd.get_many::<String>("pair"));
        for k in trie.prefix_search(key.as_bytes()) {
            println!("{k}");
        }
    }

    if let Some(cmd) = matches.subcommand_matches("find") {
        let key = cmd.get_one::<String>("key").expect(RCH);
        let tree = if let Some(load_dir) = cmd.get_one::<String>("load") {
            match SuffixTree::deserialize(Path::new(load_dir), "lexitrie") {
                Some(tree) => tree,
                None => {
                    eprintln!("failed to load index from {load_dir}");
                    return Err(Box::new(std::fmt::Error));
                }
            }
        } else {
            build_suffix_tree(cmd.get_many::<String>("pair"))
        };
        if let Some(save_dir) = cmd.get_one::<String>("save") {
            if !tree.serialize(Path::new(save_dir), "lexitrie") {
                eprintln!("failed to persist index to {save_dir}");
                return Err(Box::new(std::fmt::Error));
            }
        }
        for kv in tree.find(key.as_bytes()) {
            println!("{}\t{}", kv.key, kv.value);
        }
    }

    Ok(())
}

fn split_pairs<'a>(pairs: Option<impl Iterator<Item = &'a String>>) -> Vec<(String, String)> {
    let mut out = Vec::new();
    let Some(pairs) = pairs else { return out };
    for p in pairs {
        if let Some((k, v)) = p.split_once('=') {
            out.push((k.to_string(), v.to_string()));
        } else {
            eprintln!("ignoring malformed pair (expected KEY=VALUE): {p}");
        }
    }
    out
}

fn build_trie<'a>(pairs: Option<impl Iterator<Item = &'a String>>) -> RbTst {
    let mut trie = RbTst::new();
    for (k, v) in split_pairs(pairs) {
        trie.insert(k.as_bytes(), v);
    }
    trie
}

fn build_suffix_tree<'a>(pairs: Option<impl Iterator<Item = &'a String>>) -> SuffixTree {
    let mut tree = SuffixTree::new();
    for (k, v) in split_pairs(pairs) {
        tree.add(k.as_bytes(), v);
    }
    tree
}
