use super::error::UpdateError;
use super::github::{Asset, Release};
use super::platform::{PlatformTarget, TOOL_NAME};

/// Which rule picked the download URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    /// Asset name carries both platform and architecture
    Exact,
    /// Asset name starts with `pasls-<platform>`
    PlatformOnly,
    /// Asset is named exactly like the local binary
    GenericName,
    /// No asset matched; URL built from the tag
    ConstructedUrl,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    pub url: String,
    pub rule: MatchRule,
}

type AssetPredicate = fn(&Asset, &PlatformTarget) -> bool;

/// Tried in order, each over the whole asset list; first hit wins.
const ASSET_RULES: [(MatchRule, AssetPredicate); 3] = [
    (MatchRule::Exact, matches_platform_and_arch),
    (MatchRule::PlatformOnly, matches_platform_prefix),
    (MatchRule::GenericName, matches_binary_name),
];

fn matches_platform_and_arch(asset: &Asset, platform: &PlatformTarget) -> bool {
    let name = asset.name.to_lowercase();
    name.contains(&platform.os.canonical().to_lowercase())
        && name.contains(&platform.arch.canonical().to_lowercase())
}

fn matches_platform_prefix(asset: &Asset, platform: &PlatformTarget) -> bool {
    let prefix = format!("{}-{}", TOOL_NAME, platform.os.canonical()).to_lowercase();
    asset.name.to_lowercase().starts_with(&prefix)
}

fn matches_binary_name(asset: &Asset, platform: &PlatformTarget) -> bool {
    asset.name == platform.binary_filename()
}

/// Some releases embed the platform in the tag and ship a bare binary
fn constructed_url(
    release: &Release,
    platform: &PlatformTarget,
    download_base: &str,
) -> Option<String> {
    let tag = &release.tag_name;
    if tag.contains(platform.os.canonical()) || tag.contains(platform.arch.canonical()) {
        Some(format!(
            "{}/{}/{}",
            download_base.trim_end_matches('/'),
            tag,
            platform.binary_filename()
        ))
    } else {
        None
    }
}

/// Pick the download URL for `platform` out of a release.
///
/// `download_base` is the releases download prefix, e.g.
/// `https://github.com/<owner>/<repo>/releases/download`.
pub fn resolve_asset(
    release: &Release,
    platform: &PlatformTarget,
    download_base: &str,
) -> Result<ResolvedAsset, UpdateError> {
    for (rule, predicate) in ASSET_RULES {
        if let Some(asset) = release.assets.iter().find(|a| predicate(a, platform)) {
            return Ok(ResolvedAsset {
                url: asset.browser_download_url.clone(),
                rule,
            });
        }
    }

    constructed_url(release, platform, download_base)
        .map(|url| ResolvedAsset {
            url,
            rule: MatchRule::ConstructedUrl,
        })
        .ok_or_else(|| UpdateError::NoCompatibleAsset {
            platform: platform.os.canonical().to_string(),
            arch: platform.arch.canonical().to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://github.com/genericptr/pascal-language-server/releases/download";

    fn asset(name: &str, url: &str) -> Asset {
        Asset {
            name: name.to_string(),
            browser_download_url: url.to_string(),
        }
    }

    fn release(tag: &str, assets: Vec<Asset>) -> Release {
        Release {
            tag_name: tag.to_string(),
            assets,
        }
    }

    #[test]
    fn test_exact_match_wins() {
        let release = release(
            "v1.2",
            vec![asset("pasls-darwin-aarch64", "U1"), asset("pasls-linux", "U2")],
        );
        let resolved =
            resolve_asset(&release, &PlatformTarget::from_host("osx", "arm64"), BASE).unwrap();
        assert_eq!(resolved.url, "U1");
        assert_eq!(resolved.rule, MatchRule::Exact);
    }

    #[test]
    fn test_platform_only_match() {
        let release = release("v1.2", vec![asset("pasls-darwin", "U1")]);
        let resolved =
            resolve_asset(&release, &PlatformTarget::from_host("osx", "x64"), BASE).unwrap();
        assert_eq!(resolved.url, "U1");
        assert_eq!(resolved.rule, MatchRule::PlatformOnly);
    }

    #[test]
    fn test_generic_name_match() {
        let release = release("v1.2", vec![asset("pasls", "U1")]);
        let resolved =
            resolve_asset(&release, &PlatformTarget::from_host("linux", "x64"), BASE).unwrap();
        assert_eq!(resolved.url, "U1");
        assert_eq!(resolved.rule, MatchRule::GenericName);
    }

    #[test]
    fn test_generic_name_is_case_sensitive() {
        let release = release("v1.2", vec![asset("PASLS", "U1")]);
        let err = resolve_asset(&release, &PlatformTarget::from_host("linux", "x64"), BASE);
        assert!(matches!(err, Err(UpdateError::NoCompatibleAsset { .. })));
    }

    #[test]
    fn test_constructed_url_from_tag() {
        let release = release("v1.2-linux-x86_64", vec![]);
        let resolved =
            resolve_asset(&release, &PlatformTarget::from_host("linux", "x64"), BASE).unwrap();
        assert_eq!(resolved.url, format!("{}/v1.2-linux-x86_64/pasls", BASE));
        assert_eq!(resolved.rule, MatchRule::ConstructedUrl);
    }

    #[test]
    fn test_constructed_url_trims_trailing_slash() {
        let release = release("v1.2-linux", vec![]);
        let resolved = resolve_asset(
            &release,
            &PlatformTarget::from_host("linux", "x64"),
            "https://mirror.example/releases/",
        )
        .unwrap();
        assert_eq!(resolved.url, "https://mirror.example/releases/v1.2-linux/pasls");
    }

    #[test]
    fn test_no_compatible_asset() {
        let release = release("v1.2", vec![]);
        let err = resolve_asset(&release, &PlatformTarget::from_host("windows", "x32"), BASE)
            .unwrap_err();
        match err {
            UpdateError::NoCompatibleAsset { platform, arch } => {
                assert_eq!(platform, "win64");
                assert_eq!(arch, "i386");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_case_insensitive_name_matching() {
        let release = release("v1.2", vec![asset("PasLS-Linux-X86_64.gz", "U1")]);
        let resolved =
            resolve_asset(&release, &PlatformTarget::from_host("linux", "x64"), BASE).unwrap();
        assert_eq!(resolved.rule, MatchRule::Exact);
    }

    #[test]
    fn test_earlier_rule_beats_earlier_position() {
        // the generic binary comes first in the list, but the exact match still wins
        let release = release(
            "v1.2",
            vec![
                asset("pasls", "generic"),
                asset("pasls-linux", "platform"),
                asset("pasls-linux-x86_64", "exact"),
            ],
        );
        let resolved =
            resolve_asset(&release, &PlatformTarget::from_host("linux", "x64"), BASE).unwrap();
        assert_eq!(resolved.url, "exact");
    }

    #[test]
    fn test_non_matching_order_does_not_matter() {
        let platform = PlatformTarget::from_host("osx", "arm64");
        let target = asset("pasls-darwin-aarch64", "U1");
        let noise = vec![
            asset("pasls-win64-x86_64.exe", "N1"),
            asset("pasls-linux-i386", "N2"),
            asset("README.md", "N3"),
        ];

        let mut forward = noise.clone();
        forward.push(target.clone());
        let mut backward: Vec<Asset> = noise.into_iter().rev().collect();
        backward.insert(1, target);

        let a = resolve_asset(&release("v1", forward), &platform, BASE).unwrap();
        let b = resolve_asset(&release("v1", backward), &platform, BASE).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.url, "U1");
    }
}
